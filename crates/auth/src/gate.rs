//! Bearer-token authentication gate.
//!
//! Transport-agnostic: the HTTP layer hands in the raw `Authorization` header
//! and whatever context the request already carries, and gets back the context
//! to continue with. The gate never ends a request; denial happens later, at
//! authorization.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    AccountState, AuthenticatedContext, AuthenticationError, PrincipalStore, PrincipalStoreError,
    RequestMetadata, SecurityContext, TokenError, TokenService, TokenValidity,
};

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}

#[derive(Clone)]
pub struct AuthenticationGate {
    tokens: Arc<TokenService>,
    principals: Arc<dyn PrincipalStore>,
}

impl AuthenticationGate {
    pub fn new(tokens: Arc<TokenService>, principals: Arc<dyn PrincipalStore>) -> Self {
        Self { tokens, principals }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Run the gate for one request.
    ///
    /// `existing` is the context already attached to the request, if any; an
    /// authenticated one is passed through untouched so the gate takes effect at
    /// most once per request.
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
        existing: Option<&SecurityContext>,
        metadata: RequestMetadata,
        now: DateTime<Utc>,
    ) -> SecurityContext {
        let Some(token) = bearer_token(authorization) else {
            return existing.cloned().unwrap_or_else(SecurityContext::anonymous);
        };

        let subject = match self.tokens.extract_subject(token) {
            Ok(subject) => subject,
            Err(e) => {
                let reason = match e {
                    TokenError::SignatureInvalid => AuthenticationError::InvalidSignature,
                    _ => AuthenticationError::MalformedToken,
                };
                return reject(reason, &metadata);
            }
        };

        if let Some(ctx @ SecurityContext::Authenticated(_)) = existing {
            return ctx.clone();
        }

        let principal = match self.principals.load_by_username(&subject).await {
            Ok(principal) => principal,
            Err(PrincipalStoreError::NotFound(_)) => {
                return reject(AuthenticationError::UnknownSubject, &metadata);
            }
            Err(PrincipalStoreError::Unavailable(reason)) => {
                tracing::error!(request_id = %metadata.request_id, %reason, "principal lookup failed");
                return reject(AuthenticationError::StoreUnavailable, &metadata);
            }
        };

        match self.tokens.validate(token, &principal.username, now) {
            TokenValidity::Valid => {}
            TokenValidity::Expired => return reject(AuthenticationError::Expired, &metadata),
            TokenValidity::SubjectMismatch => {
                return reject(AuthenticationError::SubjectMismatch, &metadata);
            }
            TokenValidity::SignatureInvalid => {
                return reject(AuthenticationError::InvalidSignature, &metadata);
            }
            TokenValidity::Malformed => return reject(AuthenticationError::MalformedToken, &metadata),
        }

        match principal.account_state() {
            AccountState::Active => {}
            AccountState::Disabled => return reject(AuthenticationError::AccountDisabled, &metadata),
            AccountState::Locked => return reject(AuthenticationError::AccountLocked, &metadata),
        }

        let ctx = AuthenticatedContext::new(principal, metadata);
        tracing::debug!(
            request_id = %ctx.metadata().request_id,
            username = %ctx.username(),
            authorities = ctx.authorities().len(),
            "request authenticated"
        );
        SecurityContext::Authenticated(ctx)
    }
}

fn reject(reason: AuthenticationError, metadata: &RequestMetadata) -> SecurityContext {
    tracing::warn!(
        request_id = %metadata.request_id,
        remote_addr = metadata.remote_addr.as_deref().unwrap_or("-"),
        %reason,
        "bearer authentication rejected"
    );
    SecurityContext::rejected(reason)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use jsonwebtoken::Algorithm;

    use super::*;
    use crate::{
        Action, InMemoryPrincipalStore, Permission, Principal, ResourceKind, Role, RoleName,
        TokenConfig,
    };

    const SECRET: &str = "gate-secret";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn tokens(secret: &str) -> Arc<TokenService> {
        let config = TokenConfig::new(secret, Algorithm::HS256, Duration::minutes(10)).unwrap();
        Arc::new(TokenService::new(Arc::new(config)))
    }

    fn alice() -> Principal {
        Principal::new(
            "alice",
            "hash",
            Role::new(
                RoleName::Viewer,
                vec![Permission::new(Action::READ, ResourceKind::Project)],
            ),
        )
    }

    /// Wraps the in-memory store and counts lookups.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryPrincipalStore,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl PrincipalStore for CountingStore {
        async fn load_by_username(&self, username: &str) -> Result<Principal, PrincipalStoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.load_by_username(username).await
        }
    }

    struct DownStore;

    #[async_trait]
    impl PrincipalStore for DownStore {
        async fn load_by_username(&self, _: &str) -> Result<Principal, PrincipalStoreError> {
            Err(PrincipalStoreError::Unavailable("connection refused".to_string()))
        }
    }

    fn gate_with(principals: Vec<Principal>) -> (AuthenticationGate, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::default());
        for p in principals {
            store.inner.insert(p);
        }
        (AuthenticationGate::new(tokens(SECRET), store.clone()), store)
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    async fn run(gate: &AuthenticationGate, header: Option<&str>, now: DateTime<Utc>) -> SecurityContext {
        gate.authenticate(header, None, RequestMetadata::default(), now).await
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Bearer   abc  ")), Some("abc"));
        assert_eq!(bearer_token(Some("Bearer ")), None);
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("bearer abc")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[tokio::test]
    async fn missing_header_is_anonymous_without_reason() {
        let (gate, store) = gate_with(vec![alice()]);
        assert_eq!(run(&gate, None, t0()).await, SecurityContext::Anonymous(None));
        assert_eq!(run(&gate, Some("Basic Zm9vOmJhcg=="), t0()).await, SecurityContext::Anonymous(None));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_token_authenticates_with_derived_authorities() {
        let (gate, _) = gate_with(vec![alice()]);
        let token = gate.tokens().issue("alice", t0()).unwrap().token;

        let ctx = run(&gate, Some(bearer(&token).as_str()), t0() + Duration::seconds(1)).await;
        let auth = ctx.authenticated().expect("authenticated");
        assert_eq!(auth.username(), "alice");
        assert_eq!(auth.authorities(), &crate::authority::derive(&alice().role));
    }

    #[tokio::test]
    async fn malformed_token_is_rejected() {
        let (gate, store) = gate_with(vec![alice()]);
        let ctx = run(&gate, Some("Bearer garbage"), t0()).await;
        assert_eq!(ctx.rejection(), Some(AuthenticationError::MalformedToken));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn foreign_secret_is_rejected_before_lookup() {
        let (gate, store) = gate_with(vec![alice()]);
        let token = tokens("someone-else").issue("alice", t0()).unwrap().token;

        let ctx = run(&gate, Some(bearer(&token).as_str()), t0()).await;
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.rejection(), Some(AuthenticationError::InvalidSignature));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_subject_is_rejected() {
        let (gate, _) = gate_with(vec![]);
        let token = gate.tokens().issue("ghost", t0()).unwrap().token;
        let ctx = run(&gate, Some(bearer(&token).as_str()), t0()).await;
        assert_eq!(ctx.rejection(), Some(AuthenticationError::UnknownSubject));
    }

    #[tokio::test]
    async fn expired_token_is_reported_distinctly() {
        let (gate, _) = gate_with(vec![alice()]);
        let token = gate.tokens().issue("alice", t0()).unwrap().token;
        let ctx = run(&gate, Some(bearer(&token).as_str()), t0() + Duration::minutes(11)).await;
        assert_eq!(ctx.rejection(), Some(AuthenticationError::Expired));
    }

    #[tokio::test]
    async fn disabled_and_locked_accounts_are_rejected() {
        let (gate, _) = gate_with(vec![
            Principal::new("dora", "h", Role::new(RoleName::Admin, vec![])).with_flags(false, false),
            Principal::new("lock", "h", Role::new(RoleName::Admin, vec![])).with_flags(true, true),
        ]);
        let dora = gate.tokens().issue("dora", t0()).unwrap().token;
        let lock = gate.tokens().issue("lock", t0()).unwrap().token;

        assert_eq!(
            run(&gate, Some(bearer(&dora).as_str()), t0()).await.rejection(),
            Some(AuthenticationError::AccountDisabled)
        );
        assert_eq!(
            run(&gate, Some(bearer(&lock).as_str()), t0()).await.rejection(),
            Some(AuthenticationError::AccountLocked)
        );
    }

    #[tokio::test]
    async fn store_outage_is_rejected_not_panicked() {
        let gate = AuthenticationGate::new(tokens(SECRET), Arc::new(DownStore));
        let token = gate.tokens().issue("alice", t0()).unwrap().token;
        let ctx = run(&gate, Some(bearer(&token).as_str()), t0()).await;
        assert_eq!(ctx.rejection(), Some(AuthenticationError::StoreUnavailable));
    }

    #[tokio::test]
    async fn existing_authenticated_context_is_kept() {
        let (gate, store) = gate_with(vec![alice()]);
        let token = gate.tokens().issue("alice", t0()).unwrap().token;
        let header = bearer(&token);

        let first = run(&gate, Some(header.as_str()), t0()).await;
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);

        let second = gate
            .authenticate(Some(header.as_str()), Some(&first), RequestMetadata::default(), t0())
            .await;
        assert_eq!(second, first);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }
}
