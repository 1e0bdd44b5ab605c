//! API-side authorization guard.
//!
//! Handlers call one of these before doing any work. The evaluator decides;
//! this module only turns the decision into an HTTP response.

use std::any::Any;

use axum::response::Response;

use inventra_auth::{
    Action, AuthenticatedContext, AuthorizationDecision, PermissionEvaluator, SecurityContext,
};

use crate::app::errors;

/// Object-based check against a concrete target.
pub fn require<'a, T: Any>(
    ctx: &'a SecurityContext,
    evaluator: &PermissionEvaluator,
    target: Option<&T>,
    action: &Action,
) -> Result<&'a AuthenticatedContext, Response> {
    let decision = evaluator
        .explain(ctx, target, action)
        .map_err(errors::unknown_resource_type)?;
    enforce(ctx, decision)
}

/// Id-based check for a target that has not been loaded.
pub fn require_by_id<'a>(
    ctx: &'a SecurityContext,
    evaluator: &PermissionEvaluator,
    target_id: Option<i64>,
    kind_name: &str,
    action: &Action,
) -> Result<&'a AuthenticatedContext, Response> {
    let decision = evaluator
        .explain_by_id(ctx, target_id, kind_name, action)
        .map_err(errors::unknown_resource_type)?;
    enforce(ctx, decision)
}

/// Any authenticated principal will do.
pub fn require_authenticated(ctx: &SecurityContext) -> Result<&AuthenticatedContext, Response> {
    ctx.authenticated()
        .ok_or_else(|| errors::unauthenticated(ctx))
}

fn enforce(
    ctx: &SecurityContext,
    decision: AuthorizationDecision,
) -> Result<&AuthenticatedContext, Response> {
    let auth = require_authenticated(ctx)?;
    if decision.granted {
        return Ok(auth);
    }

    let message = match (&decision.required_authority, decision.kind) {
        (Some(authority), _) => format!("missing authority {authority}"),
        (None, Some(kind)) => format!("{} on {kind} denied", decision.action),
        (None, None) => format!("{} denied", decision.action),
    };
    Err(errors::forbidden(message))
}
