//! Middleware rules.

use crate::condition::Condition;
use crate::exchange::Exchange;
use daedalus_core::{Phase, RouteContext};
use std::sync::Arc;

/// A type-erased middleware callback.
///
/// Callbacks receive the request [`Exchange`], through which they set
/// response headers or terminate the request. Returning an error aborts the
/// whole request.
pub type Callback = Arc<dyn Fn(&mut Exchange) -> anyhow::Result<()> + Send + Sync + 'static>;

/// Position of a rule in registration order.
///
/// Returned by [`RuleHandle::id`](crate::RuleHandle::id) so a condition can be
/// attached to a specific rule later, without relying on which rule was
/// registered last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub(crate) usize);

impl RuleId {
    /// Returns the zero-based registration index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A registered middleware hook.
pub struct MiddlewareRule {
    pub(crate) id: RuleId,
    pub(crate) name: Option<String>,
    pub(crate) phase: Phase,
    pub(crate) condition: Condition,
    pub(crate) callback: Callback,
}

impl MiddlewareRule {
    pub(crate) fn new(id: RuleId, phase: Phase, callback: Callback) -> Self {
        Self {
            id,
            name: None,
            phase,
            condition: Condition::always(),
            callback,
        }
    }

    /// Returns the rule's registration id.
    #[must_use]
    pub const fn id(&self) -> RuleId {
        self.id
    }

    /// Returns the rule name, if one was given.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the phase this rule runs in.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the attached condition.
    #[must_use]
    pub const fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Label used in logs and errors: the name, or `#<index>`.
    #[must_use]
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("#{}", self.id.0))
    }

    /// Whether this rule runs for the given route and phase.
    #[must_use]
    pub fn applies_to(&self, route: &RouteContext) -> bool {
        self.phase == route.phase() && self.condition.matches(route)
    }

    pub(crate) fn invoke(&self, exchange: &mut Exchange) -> anyhow::Result<()> {
        (self.callback)(exchange)
    }
}

impl std::fmt::Debug for MiddlewareRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareRule")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("phase", &self.phase)
            .field("condition", &self.condition)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionKind;

    fn noop() -> Callback {
        Arc::new(|_| Ok(()))
    }

    #[test]
    fn test_new_rule_is_unconditional() {
        let rule = MiddlewareRule::new(RuleId(0), Phase::Before, noop());
        assert_eq!(rule.condition().kind(), ConditionKind::None);
        assert!(rule.applies_to(&RouteContext::new("anything")));
    }

    #[test]
    fn test_rule_only_applies_in_its_phase() {
        let rule = MiddlewareRule::new(RuleId(0), Phase::After, noop());
        let route = RouteContext::new("admin");
        assert!(!rule.applies_to(&route));
        assert!(rule.applies_to(&route.with_phase(Phase::After)));
    }

    #[test]
    fn test_label_falls_back_to_index() {
        let mut rule = MiddlewareRule::new(RuleId(3), Phase::Before, noop());
        assert_eq!(rule.label(), "#3");

        rule.name = Some("cors".to_string());
        assert_eq!(rule.label(), "cors");
    }
}
