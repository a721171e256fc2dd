//! Conditional middleware pipeline.
//!
//! Rules are registered on a [`PipelineBuilder`] during application
//! bootstrap and frozen into an immutable [`Pipeline`]. For every request the
//! pipeline resolves the rules whose phase and condition match the route and
//! runs them in registration order.
//!
//! ## Request Lifecycle
//!
//! ```text
//! Request → BEFORE hooks → Handler → AFTER hooks → Response
//!               │              │          │
//!               └── redirect/abort ───────┴──→ termination response
//! ```
//!
//! - A terminating action in a BEFORE hook skips the remaining BEFORE hooks,
//!   the handler and every AFTER hook.
//! - A terminating action in the handler skips every AFTER hook.
//! - A terminating action in an AFTER hook skips the remaining AFTER hooks
//!   and replaces the handler's response.

use crate::condition::{Condition, ConditionKind};
use crate::error::PipelineError;
use crate::exchange::{Exchange, Termination, REQUEST_ID_HEADER};
use crate::rule::{Callback, MiddlewareRule, RuleId};
use crate::types::{Request, Response};
use daedalus_core::{Phase, RequestId, RouteContext};
use daedalus_telemetry::metrics::{record_hook_executed, record_termination};
use std::sync::Arc;

/// Outcome of running one phase of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Every resolved callback ran without terminating the request.
    Continue,
    /// A callback terminated the request; later callbacks were skipped.
    Terminated(Termination),
}

/// The immutable middleware pipeline.
///
/// # Example
///
/// ```
/// use daedalus_middleware::{ConditionKind, Pipeline};
/// use daedalus_core::RouteContext;
/// use http::StatusCode;
///
/// let mut builder = Pipeline::builder();
/// builder
///     .before(|exchange| {
///         exchange.abort(StatusCode::UNAUTHORIZED);
///         Ok(())
///     })
///     .on(ConditionKind::StartsWith, "admin")
///     .named("auth");
/// let pipeline = builder.build();
///
/// assert_eq!(pipeline.resolve(&RouteContext::new("/admin/posts")).len(), 1);
/// assert!(pipeline.resolve(&RouteContext::new("/blog")).is_empty());
/// ```
#[derive(Debug)]
pub struct Pipeline {
    rules: Vec<MiddlewareRule>,
    base_path: Option<String>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Returns all rules in registration order.
    #[must_use]
    pub fn rules(&self) -> &[MiddlewareRule] {
        &self.rules
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Builds the route context for an incoming request, stripping the
    /// configured base path.
    #[must_use]
    pub fn route_for(&self, request: &Request) -> RouteContext {
        RouteContext::from_uri(request.uri(), self.base_path.as_deref())
    }

    /// Returns the rules to run for `route`, in registration order.
    ///
    /// A rule is included when its phase equals `route.phase()` and its
    /// condition matches the route.
    #[must_use]
    pub fn resolve(&self, route: &RouteContext) -> Vec<&MiddlewareRule> {
        self.rules
            .iter()
            .filter(|rule| rule.applies_to(route))
            .collect()
    }

    /// Runs every rule resolved for `phase`, stopping at the first
    /// terminating action.
    ///
    /// If the exchange is already terminated nothing runs.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Callback`] as soon as a callback fails; the
    /// remaining callbacks are not run.
    pub fn execute(&self, phase: Phase, exchange: &mut Exchange) -> Result<Flow, PipelineError> {
        if let Some(termination) = exchange.termination() {
            return Ok(Flow::Terminated(termination.clone()));
        }

        exchange.set_phase(phase);
        let route = exchange.route();

        for rule in self.resolve(&route) {
            tracing::debug!(
                request_id = %exchange.request_id(),
                route.path = %route.path(),
                phase = %phase,
                rule = %rule.label(),
                "running middleware"
            );
            record_hook_executed(phase.as_str());

            rule.invoke(exchange).map_err(|source| {
                tracing::error!(
                    request_id = %exchange.request_id(),
                    rule = %rule.label(),
                    phase = %phase,
                    error = %source,
                    "middleware failed"
                );
                PipelineError::Callback {
                    rule: rule.label(),
                    phase,
                    source,
                }
            })?;

            if let Some(termination) = exchange.termination() {
                tracing::info!(
                    request_id = %exchange.request_id(),
                    route.path = %route.path(),
                    phase = %phase,
                    rule = %rule.label(),
                    action = termination.kind(),
                    "middleware terminated request"
                );
                record_termination(phase.as_str(), termination.kind());
                return Ok(Flow::Terminated(termination.clone()));
            }
        }

        Ok(Flow::Continue)
    }

    /// Processes a request through BEFORE hooks, the handler and AFTER hooks.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Callback`] if a hook fails and
    /// [`PipelineError::Handler`] if the handler fails.
    pub fn process<H>(&self, request: Request, handler: H) -> Result<Response, PipelineError>
    where
        H: FnOnce(&mut Exchange, Request) -> anyhow::Result<Response>,
    {
        let route = self.route_for(&request);
        self.run(route, request, handler)
    }

    /// Like [`Pipeline::process`], with the symbolic route name resolved by
    /// the front controller so `Equals`/`Except` conditions can match it.
    ///
    /// # Errors
    ///
    /// Same as [`Pipeline::process`].
    pub fn process_route<H>(
        &self,
        route_name: &str,
        request: Request,
        handler: H,
    ) -> Result<Response, PipelineError>
    where
        H: FnOnce(&mut Exchange, Request) -> anyhow::Result<Response>,
    {
        let route = self.route_for(&request).with_route_name(route_name);
        self.run(route, request, handler)
    }

    fn run<H>(
        &self,
        route: RouteContext,
        request: Request,
        handler: H,
    ) -> Result<Response, PipelineError>
    where
        H: FnOnce(&mut Exchange, Request) -> anyhow::Result<Response>,
    {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(RequestId::parse)
            .unwrap_or_default();

        let mut exchange = Exchange::new(route)
            .with_request_id(request_id)
            .with_request_headers(request.headers().clone());

        if let Flow::Terminated(termination) = self.execute(Phase::Before, &mut exchange)? {
            return Ok(exchange.finish(termination.into_response()));
        }

        let response = handler(&mut exchange, request).map_err(|source| {
            tracing::error!(request_id = %exchange.request_id(), error = %source, "handler failed");
            PipelineError::Handler { source }
        })?;

        if let Some(termination) = exchange.termination().cloned() {
            tracing::info!(
                request_id = %exchange.request_id(),
                action = termination.kind(),
                "handler terminated request"
            );
            record_termination("handler", termination.kind());
            return Ok(exchange.finish(termination.into_response()));
        }

        let response = match self.execute(Phase::After, &mut exchange)? {
            Flow::Continue => response,
            Flow::Terminated(termination) => termination.into_response(),
        };

        Ok(exchange.finish(response))
    }
}

/// Builder for constructing a [`Pipeline`].
///
/// Passed through application initialization in place of a global registry.
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    rules: Vec<MiddlewareRule>,
    base_path: Option<String>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an unconditional rule for `phase`.
    ///
    /// The returned handle is bound to the new rule and can attach a condition
    /// or a name to it.
    pub fn register<F>(&mut self, callback: F, phase: Phase) -> RuleHandle<'_>
    where
        F: Fn(&mut Exchange) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = RuleId(self.rules.len());
        let callback: Callback = Arc::new(callback);
        self.rules.push(MiddlewareRule::new(id, phase, callback));
        RuleHandle { builder: self, id }
    }

    /// Registers a rule that runs before the route handler.
    pub fn before<F>(&mut self, callback: F) -> RuleHandle<'_>
    where
        F: Fn(&mut Exchange) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(callback, Phase::Before)
    }

    /// Registers a rule that runs after the route handler.
    pub fn after<F>(&mut self, callback: F) -> RuleHandle<'_>
    where
        F: Fn(&mut Exchange) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register(callback, Phase::After)
    }

    /// Replaces the condition of a previously registered rule.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] if `id` does not belong to
    /// this builder.
    pub fn condition(
        &mut self,
        id: RuleId,
        kind: ConditionKind,
        value: &str,
    ) -> Result<&mut Self, PipelineError> {
        let rule = self.rules.get_mut(id.0).ok_or_else(|| {
            PipelineError::configuration(format!("no middleware rule with index {}", id.0))
        })?;
        rule.condition = Condition::new(kind, value);
        Ok(self)
    }

    /// Sets the mount prefix stripped from request paths before matching.
    pub fn base_path(&mut self, base_path: impl Into<String>) -> &mut Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Freezes the builder into an immutable pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        tracing::debug!(rules = self.rules.len(), "middleware pipeline built");
        Pipeline {
            rules: self.rules,
            base_path: self.base_path,
        }
    }
}

/// Handle bound to one registered rule.
///
/// Conditions attach to the rule this handle was created for, never to
/// whichever rule happens to be the most recent.
#[derive(Debug)]
pub struct RuleHandle<'a> {
    builder: &'a mut PipelineBuilder,
    id: RuleId,
}

impl RuleHandle<'_> {
    /// Returns the id of the bound rule.
    #[must_use]
    pub const fn id(&self) -> RuleId {
        self.id
    }

    fn rule(&mut self) -> &mut MiddlewareRule {
        &mut self.builder.rules[self.id.0]
    }

    /// Attaches a condition, replacing any previous one.
    #[must_use]
    pub fn on(mut self, kind: ConditionKind, value: &str) -> Self {
        self.rule().condition = Condition::new(kind, value);
        self
    }

    /// Attaches a condition given by its textual kind (e.g. `"startWith"`).
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] for an unknown kind; the rule
    /// keeps its previous condition.
    pub fn on_named(self, kind: &str, value: &str) -> Result<Self, PipelineError> {
        let kind: ConditionKind = kind.parse()?;
        Ok(self.on(kind, value))
    }

    /// Names the rule for logs and error messages.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.rule().name = Some(name.into());
        self
    }
}
