//! Permission evaluation against a request's security context.
//!
//! - No IO
//! - No panics
//! - Exact-string authority matching, no wildcards
//!
//! A classification failure on the non-root path is returned as an error, not
//! folded into a deny: it means the resource registry is out of sync with the
//! domain model.

use std::any::Any;

use serde::Serialize;

use crate::{
    Action, AuthenticatedContext, Authority, ResourceClassifier, ResourceKind, SecurityContext,
    UnknownResourceType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// No authenticated principal on the request.
    Unauthenticated,
    /// Principal holds `ROLE_ROOT`.
    RootBypass,
    AuthorityMatched,
    MissingAuthority,
    /// Object-based check with no object to check against.
    NoTarget,
}

/// Auditable record of one authorization decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationDecision {
    pub granted: bool,
    pub reason: DecisionReason,
    pub username: Option<String>,
    pub action: Action,
    /// Resolved kind; `None` when resolution was skipped or impossible.
    pub kind: Option<ResourceKind>,
    pub target_id: Option<i64>,
    pub required_authority: Option<Authority>,
}

/// Decides allow/deny for `(principal, target, action)`.
#[derive(Debug, Clone)]
pub struct PermissionEvaluator {
    classifier: ResourceClassifier,
}

impl PermissionEvaluator {
    pub fn new(classifier: ResourceClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &ResourceClassifier {
        &self.classifier
    }

    /// Object-based check. The target's concrete type decides its kind.
    pub fn has_permission<T: Any>(
        &self,
        ctx: &SecurityContext,
        target: Option<&T>,
        action: &Action,
    ) -> Result<bool, UnknownResourceType> {
        self.explain(ctx, target, action).map(|d| d.granted)
    }

    /// Id-based check, for when the object has not been loaded yet.
    pub fn has_permission_by_id(
        &self,
        ctx: &SecurityContext,
        target_id: Option<i64>,
        kind_name: &str,
        action: &Action,
    ) -> Result<bool, UnknownResourceType> {
        self.explain_by_id(ctx, target_id, kind_name, action)
            .map(|d| d.granted)
    }

    pub fn explain<T: Any>(
        &self,
        ctx: &SecurityContext,
        target: Option<&T>,
        action: &Action,
    ) -> Result<AuthorizationDecision, UnknownResourceType> {
        self.decide(ctx, None, action, || {
            target.map(|t| self.classifier.classify(t)).transpose()
        })
    }

    pub fn explain_by_id(
        &self,
        ctx: &SecurityContext,
        target_id: Option<i64>,
        kind_name: &str,
        action: &Action,
    ) -> Result<AuthorizationDecision, UnknownResourceType> {
        self.decide(ctx, target_id, action, || {
            self.classifier.classify_name(kind_name).map(Some)
        })
    }

    fn decide<F>(
        &self,
        ctx: &SecurityContext,
        target_id: Option<i64>,
        action: &Action,
        resolve_kind: F,
    ) -> Result<AuthorizationDecision, UnknownResourceType>
    where
        F: FnOnce() -> Result<Option<ResourceKind>, UnknownResourceType>,
    {
        let mut decision = AuthorizationDecision {
            granted: false,
            reason: DecisionReason::Unauthenticated,
            username: None,
            action: action.clone(),
            kind: None,
            target_id,
            required_authority: None,
        };

        let Some(auth) = ctx.authenticated() else {
            audit(&decision);
            return Ok(decision);
        };
        decision.username = Some(auth.username().to_string());

        // Checked before classification so an unmapped shape never blocks root.
        if auth.authorities().is_root() {
            decision.granted = true;
            decision.reason = DecisionReason::RootBypass;
            audit(&decision);
            return Ok(decision);
        }

        let kind = match resolve_kind() {
            Ok(Some(kind)) => kind,
            Ok(None) => {
                decision.reason = DecisionReason::NoTarget;
                audit(&decision);
                return Ok(decision);
            }
            Err(e) => {
                tracing::error!(
                    target: "inventra::audit",
                    username = %auth.username(),
                    %action,
                    error = %e,
                    "resource classification failed"
                );
                return Err(e);
            }
        };

        let required = Authority::permission(action, kind);
        decision.granted = holds(auth, &required);
        decision.reason = if decision.granted {
            DecisionReason::AuthorityMatched
        } else {
            DecisionReason::MissingAuthority
        };
        decision.kind = Some(kind);
        decision.required_authority = Some(required);
        audit(&decision);
        Ok(decision)
    }
}

fn holds(auth: &AuthenticatedContext, required: &Authority) -> bool {
    auth.authorities().contains(required)
}

fn audit(decision: &AuthorizationDecision) {
    let username = decision.username.as_deref().unwrap_or("<anonymous>");
    let kind = decision.kind.map(ResourceKind::as_str).unwrap_or("-");
    if decision.granted {
        tracing::debug!(
            target: "inventra::audit",
            username,
            action = %decision.action,
            kind,
            target_id = ?decision.target_id,
            reason = ?decision.reason,
            "access granted"
        );
    } else {
        tracing::info!(
            target: "inventra::audit",
            username,
            action = %decision.action,
            kind,
            target_id = ?decision.target_id,
            reason = ?decision.reason,
            "access denied"
        );
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{
        Permission, Principal, RequestMetadata, ResourceRegistry, Role, RoleName, authority,
    };

    struct Project {
        #[allow(dead_code)]
        id: i64,
    }
    struct Unclassifiable;

    fn evaluator() -> PermissionEvaluator {
        let registry = ResourceRegistry::builder()
            .register::<Project>(ResourceKind::Project)
            .build()
            .unwrap();
        PermissionEvaluator::new(ResourceClassifier::new(registry))
    }

    fn ctx(username: &str, role: Role) -> SecurityContext {
        SecurityContext::Authenticated(AuthenticatedContext::new(
            Principal::new(username, "h", role),
            RequestMetadata::default(),
        ))
    }

    fn alice() -> SecurityContext {
        ctx(
            "alice",
            Role::new(
                RoleName::Viewer,
                vec![Permission::new(Action::READ, ResourceKind::Project)],
            ),
        )
    }

    fn root1() -> SecurityContext {
        ctx("root1", Role::new(RoleName::Root, vec![]))
    }

    #[test]
    fn viewer_reads_but_cannot_write_project() {
        let ev = evaluator();
        let project = Project { id: 42 };

        assert!(ev.has_permission(&alice(), Some(&project), &Action::READ).unwrap());
        assert!(!ev.has_permission(&alice(), Some(&project), &Action::WRITE).unwrap());
        assert!(ev.has_permission_by_id(&alice(), Some(42), "project", &Action::READ).unwrap());
        assert!(!ev.has_permission_by_id(&alice(), Some(42), "RACK", &Action::READ).unwrap());
    }

    #[test]
    fn root_bypasses_before_classification() {
        let ev = evaluator();
        assert!(ev.has_permission(&root1(), Some(&Unclassifiable), &Action::DELETE).unwrap());
        assert!(ev.has_permission_by_id(&root1(), None, "no-such-kind", &Action::DELETE).unwrap());
        assert!(ev.has_permission::<Project>(&root1(), None, &Action::READ).unwrap());

        let d = ev.explain(&root1(), Some(&Unclassifiable), &Action::DELETE).unwrap();
        assert_eq!(d.reason, DecisionReason::RootBypass);
        assert_eq!(d.kind, None);
    }

    #[test]
    fn non_root_classification_failure_is_an_error() {
        let ev = evaluator();
        assert!(ev.has_permission(&alice(), Some(&Unclassifiable), &Action::READ).is_err());
        let err = ev
            .has_permission_by_id(&alice(), Some(1), "mainframe", &Action::READ)
            .unwrap_err();
        assert_eq!(err.type_name, "mainframe");
    }

    #[test]
    fn anonymous_is_denied_without_classifying() {
        let ev = evaluator();
        for anon in [
            SecurityContext::anonymous(),
            SecurityContext::rejected(crate::AuthenticationError::InvalidSignature),
        ] {
            assert!(!ev.has_permission(&anon, Some(&Project { id: 1 }), &Action::READ).unwrap());
            let d = ev.explain(&anon, Some(&Unclassifiable), &Action::READ).unwrap();
            assert_eq!(d.reason, DecisionReason::Unauthenticated);
        }
    }

    #[test]
    fn missing_target_object_is_denied_for_non_root() {
        let d = evaluator().explain::<Project>(&alice(), None, &Action::READ).unwrap();
        assert!(!d.granted);
        assert_eq!(d.reason, DecisionReason::NoTarget);
    }

    #[test]
    fn action_match_is_exact() {
        let ev = evaluator();
        let project = Project { id: 1 };
        assert!(!ev.has_permission(&alice(), Some(&project), &Action::new("read")).unwrap());
        assert!(!ev.has_permission(&alice(), Some(&project), &Action::new("REA")).unwrap());
        assert!(!ev.has_permission(&alice(), Some(&project), &Action::new("READ_PROJECT")).unwrap());
    }

    #[test]
    fn decision_names_the_required_authority() {
        let d = evaluator()
            .explain_by_id(&alice(), Some(7), "project", &Action::WRITE)
            .unwrap();
        assert_eq!(d.reason, DecisionReason::MissingAuthority);
        assert_eq!(d.required_authority.unwrap().as_str(), "PROJECT_WRITE_PROJECT");
        assert_eq!(d.target_id, Some(7));
        assert_eq!(d.username.as_deref(), Some("alice"));
    }

    fn any_kind() -> impl Strategy<Value = ResourceKind> {
        prop::sample::select(ResourceKind::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn root_is_allowed_everything(action in "[A-Z_]{1,12}", kind in any_kind(), junk in "[a-z]{1,12}") {
            let ev = evaluator();
            let action = Action::new(action);
            prop_assert!(ev.has_permission_by_id(&root1(), None, kind.as_str(), &action).unwrap());
            prop_assert!(ev.has_permission_by_id(&root1(), None, &junk, &action).unwrap());
        }

        #[test]
        fn non_root_is_denied_everything_not_granted(
            granted in prop::collection::vec((prop::sample::select(vec!["READ", "WRITE", "DELETE"]), any_kind()), 0..6),
            action in prop::sample::select(vec!["READ", "WRITE", "DELETE", "AUDIT"]),
            kind in any_kind(),
        ) {
            let role = Role::new(
                RoleName::Admin,
                granted.iter().map(|(a, k)| Permission::new(Action::new(*a), *k)).collect(),
            );
            let fresh = authority::derive(&role);
            let ctx = ctx("bob", role);
            let action = Action::new(action);

            let allowed = evaluator().has_permission_by_id(&ctx, None, kind.as_str(), &action).unwrap();
            let expected = fresh.contains(&Authority::permission(&action, kind));
            prop_assert_eq!(allowed, expected);
        }
    }
}
