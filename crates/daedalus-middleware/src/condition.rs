//! Route conditions that decide whether a middleware rule applies.
//!
//! | Kind | Matches when |
//! |------|--------------|
//! | [`ConditionKind::StartsWith`] | the path begins with the value |
//! | [`ConditionKind::Contains`] | the value is a substring of the path |
//! | [`ConditionKind::Equals`] | the path or the route name equals the value |
//! | [`ConditionKind::Except`] | neither the path nor the route name equals the value |
//! | [`ConditionKind::None`] | always |
//!
//! Path comparisons run against the request path framed by slashes
//! (`/admin/posts/`), so a value written with separators keeps its segment
//! boundaries: `"api/"` matches `api/posts` but not `apiary`. Route names are
//! compared against the value exactly as it was registered.

use crate::error::PipelineError;
use daedalus_core::RouteContext;
use std::str::FromStr;

/// The comparison a [`Condition`] performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    /// Path begins with the value.
    StartsWith,
    /// Everything except the named path or route.
    Except,
    /// Path or route name equals the value.
    Equals,
    /// Path contains the value.
    Contains,
    /// Unconditional.
    #[default]
    None,
}

impl ConditionKind {
    /// Returns the canonical name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StartsWith => "startWith",
            Self::Except => "except",
            Self::Equals => "equal",
            Self::Contains => "contain",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionKind {
    type Err = PipelineError;

    /// Parses a condition kind, ignoring case, `_` and `-`.
    ///
    /// Accepts `startWith`/`startsWith`, `except`, `equal`/`equals`,
    /// `contain`/`contains` and `none`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "startwith" | "startswith" => Ok(Self::StartsWith),
            "except" => Ok(Self::Except),
            "equal" | "equals" => Ok(Self::Equals),
            "contain" | "contains" => Ok(Self::Contains),
            "none" => Ok(Self::None),
            _ => Err(PipelineError::configuration(format!(
                "unknown condition kind `{s}`"
            ))),
        }
    }
}

/// A single route condition attached to a middleware rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Condition {
    kind: ConditionKind,
    value: String,
    pattern: String,
}

impl Condition {
    /// Creates a condition.
    ///
    /// Repeated slashes in `value` are collapsed for path matching; the value
    /// itself is kept verbatim for route name comparisons.
    #[must_use]
    pub fn new(kind: ConditionKind, value: &str) -> Self {
        let collapsed = collapse_slashes(value);
        let pattern = match kind {
            ConditionKind::StartsWith => format!("/{}", collapsed.trim_start_matches('/')),
            ConditionKind::Contains => collapsed,
            ConditionKind::Equals | ConditionKind::Except => {
                collapsed.trim_matches('/').to_string()
            }
            ConditionKind::None => String::new(),
        };

        Self {
            kind,
            value: value.to_string(),
            pattern,
        }
    }

    /// The unconditional condition.
    #[must_use]
    pub fn always() -> Self {
        Self::default()
    }

    /// Returns the condition kind.
    #[must_use]
    pub const fn kind(&self) -> ConditionKind {
        self.kind
    }

    /// Returns the condition value as registered.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Evaluates the condition against a route.
    ///
    /// A `Contains` value made only of slashes never matches.
    #[must_use]
    pub fn matches(&self, route: &RouteContext) -> bool {
        match self.kind {
            ConditionKind::None => true,
            ConditionKind::StartsWith => framed(route.path()).starts_with(&self.pattern),
            ConditionKind::Contains => {
                !self.pattern.trim_matches('/').is_empty()
                    && framed(route.path()).contains(&self.pattern)
            }
            ConditionKind::Equals => self.names(route),
            ConditionKind::Except => !self.names(route),
        }
    }

    fn names(&self, route: &RouteContext) -> bool {
        route.path() == self.pattern || route.route_name() == Some(self.value.as_str())
    }
}

/// `admin/posts` → `/admin/posts/`, root → `/`.
fn framed(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        format!("/{path}/")
    }
}

fn collapse_slashes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn route(path: &str) -> RouteContext {
        RouteContext::new(path)
    }

    #[test]
    fn test_none_always_matches() {
        let condition = Condition::always();
        assert!(condition.matches(&route("")));
        assert!(condition.matches(&route("admin/posts")));
    }

    #[test]
    fn test_starts_with() {
        let condition = Condition::new(ConditionKind::StartsWith, "api");
        assert!(condition.matches(&route("api/posts")));
        assert!(condition.matches(&route("apiary")));
        assert!(!condition.matches(&route("web/api")));
    }

    #[test]
    fn test_starts_with_ignores_leading_slash() {
        let condition = Condition::new(ConditionKind::StartsWith, "/admin");
        assert_eq!(condition.value(), "/admin");
        assert!(condition.matches(&route("/admin/posts")));
        assert!(!condition.matches(&route("web/admin")));
    }

    #[test]
    fn test_starts_with_trailing_slash_keeps_segment_boundary() {
        let condition = Condition::new(ConditionKind::StartsWith, "api/");
        assert!(condition.matches(&route("api")));
        assert!(condition.matches(&route("api/posts")));
        assert!(!condition.matches(&route("apiary")));

        let condition = Condition::new(ConditionKind::StartsWith, "//admin//posts/");
        assert!(condition.matches(&route("admin/posts/3")));
        assert!(!condition.matches(&route("admin/postscript")));
    }

    #[test]
    fn test_starts_with_root_matches_everything() {
        let condition = Condition::new(ConditionKind::StartsWith, "/");
        assert!(condition.matches(&route("")));
        assert!(condition.matches(&route("login")));
    }

    #[test]
    fn test_contains() {
        let condition = Condition::new(ConditionKind::Contains, "edit");
        assert!(condition.matches(&route("admin/posts/edit/3")));
        assert!(!condition.matches(&route("admin/posts")));
    }

    #[test]
    fn test_contains_with_separators_matches_whole_segments() {
        let condition = Condition::new(ConditionKind::Contains, "/edit/");
        assert!(condition.matches(&route("admin/posts/edit/3")));
        assert!(condition.matches(&route("edit")));
        assert!(!condition.matches(&route("credit")));
        assert!(!condition.matches(&route("admin/credit/3")));

        let condition = Condition::new(ConditionKind::Contains, "posts/edit");
        assert!(condition.matches(&route("admin/posts/edit/3")));
    }

    #[test]
    fn test_contains_slash_only_value_never_matches() {
        for value in ["/", "//", ""] {
            let condition = Condition::new(ConditionKind::Contains, value);
            assert!(!condition.matches(&route("login")));
            assert!(!condition.matches(&route("admin/posts")));
        }
    }

    #[test]
    fn test_equals_path_or_route_name() {
        let condition = Condition::new(ConditionKind::Equals, "login");
        assert!(condition.matches(&route("/login")));
        assert!(!condition.matches(&route("login/reset")));

        let named = RouteContext::new("auth/sign-in").with_route_name("login");
        assert!(condition.matches(&named));
    }

    #[test]
    fn test_equals_compares_route_name_verbatim() {
        for name in ["posts#index", "search?q", "/login", "admin/posts/"] {
            let condition = Condition::new(ConditionKind::Equals, name);
            assert_eq!(condition.value(), name);

            let named = RouteContext::new("somewhere/else").with_route_name(name);
            assert!(condition.matches(&named), "{name}");
        }
    }

    #[test]
    fn test_equals_route_name_does_not_match_truncated_path() {
        let condition = Condition::new(ConditionKind::Equals, "posts#index");
        assert!(!condition.matches(&route("posts")));

        let condition = Condition::new(ConditionKind::Equals, "/login");
        assert!(condition.matches(&route("login")));
        assert!(!condition.matches(&RouteContext::new("auth").with_route_name("login")));
    }

    #[test]
    fn test_except_excludes_route_name_with_separators() {
        let condition = Condition::new(ConditionKind::Except, "posts#index");
        let named = RouteContext::new("posts").with_route_name("posts#index");
        assert!(!condition.matches(&named));
        assert!(condition.matches(&route("posts")));
    }

    #[test]
    fn test_except_excludes_only_exact_match() {
        let condition = Condition::new(ConditionKind::Except, "login");
        assert!(!condition.matches(&route("login")));
        assert!(condition.matches(&route("login/reset")));
        assert!(condition.matches(&route("admin")));

        let named = RouteContext::new("auth/sign-in").with_route_name("login");
        assert!(!condition.matches(&named));
    }

    #[test]
    fn test_parse_kind_names() {
        assert_eq!("startWith".parse::<ConditionKind>().unwrap(), ConditionKind::StartsWith);
        assert_eq!("starts_with".parse::<ConditionKind>().unwrap(), ConditionKind::StartsWith);
        assert_eq!("EQUAL".parse::<ConditionKind>().unwrap(), ConditionKind::Equals);
        assert_eq!("contains".parse::<ConditionKind>().unwrap(), ConditionKind::Contains);
        assert_eq!("except".parse::<ConditionKind>().unwrap(), ConditionKind::Except);
        assert_eq!("none".parse::<ConditionKind>().unwrap(), ConditionKind::None);
    }

    #[test]
    fn test_parse_unknown_kind_is_configuration_error() {
        let err = "between".parse::<ConditionKind>().unwrap_err();
        assert!(matches!(err, PipelineError::Configuration { .. }));
        assert!(err.to_string().contains("between"));
    }

    #[test]
    fn test_kind_display_round_trips() {
        for kind in [
            ConditionKind::StartsWith,
            ConditionKind::Except,
            ConditionKind::Equals,
            ConditionKind::Contains,
            ConditionKind::None,
        ] {
            assert_eq!(kind.to_string().parse::<ConditionKind>().unwrap(), kind);
        }
    }

    proptest! {
        #[test]
        fn none_matches_any_path(path in "[a-z0-9/]{0,32}") {
            prop_assert!(Condition::always().matches(&route(&path)));
        }

        #[test]
        fn except_is_negation_of_equals(path in "[a-c/]{0,8}", value in "[a-c]{0,3}") {
            let ctx = route(&path);
            let equals = Condition::new(ConditionKind::Equals, &value).matches(&ctx);
            let except = Condition::new(ConditionKind::Except, &value).matches(&ctx);
            prop_assert_eq!(equals, !except);
        }

        #[test]
        fn equals_matches_its_own_route_name(
            value in "\\PC{0,24}",
            path in "[a-z/]{0,12}",
        ) {
            let ctx = route(&path).with_route_name(value.clone());
            prop_assert!(Condition::new(ConditionKind::Equals, &value).matches(&ctx));
            prop_assert!(!Condition::new(ConditionKind::Except, &value).matches(&ctx));
        }

        #[test]
        fn starts_with_implies_contains(path in "[a-c/]{0,12}", value in "[a-c]{1,3}") {
            let ctx = route(&path);
            if Condition::new(ConditionKind::StartsWith, &value).matches(&ctx) {
                prop_assert!(Condition::new(ConditionKind::Contains, &value).matches(&ctx));
            }
        }
    }
}
