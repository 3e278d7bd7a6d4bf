//! auth::provider
//!
//! SessionManager - TokenProvider backed by a stored session.
//!
//! # Architecture
//!
//! The session manager:
//! - Loads the session bundle from the SecretStore
//! - Renews the access token silently when it is inside the expiry buffer
//! - Runs the interactive sign-in and sign-out flows
//! - Never logs or returns token values except through `bearer_token`
//!
//! # Example
//!
//! ```ignore
//! use gallerist::auth::{GoogleDeviceFlow, SessionManager, TokenProvider};
//! use gallerist::secrets;
//! use std::sync::Arc;
//!
//! let identity = Arc::new(GoogleDeviceFlow::new(client_id, None));
//! let manager = SessionManager::new(client_id, identity, secrets::create_store("file")?);
//!
//! let token = manager.bearer_token().await?;
//! ```

use std::sync::{Arc, RwLock};

use super::errors::AuthError;
use super::session::{SessionBundle, SESSION_SECRET_KEY};
use super::{IdentityProvider, PromptMode, TokenProvider};
use crate::secrets::SecretStore;

/// Sign-in session manager.
pub struct SessionManager {
    client_id: String,
    identity: Arc<dyn IdentityProvider>,
    store: Box<dyn SecretStore>,
    cache: RwLock<Option<SessionBundle>>,
}

impl SessionManager {
    /// Create a manager for an OAuth client.
    pub fn new(
        client_id: &str,
        identity: Arc<dyn IdentityProvider>,
        store: Box<dyn SecretStore>,
    ) -> Self {
        Self {
            client_id: client_id.to_string(),
            identity,
            store,
            cache: RwLock::new(None),
        }
    }

    fn load_session(&self) -> Result<Option<SessionBundle>, AuthError> {
        match self.store.get(SESSION_SECRET_KEY)? {
            Some(json) => Ok(Some(SessionBundle::parse(&json)?)),
            None => Ok(None),
        }
    }

    fn save_session(&self, session: &SessionBundle) -> Result<(), AuthError> {
        self.store.set(SESSION_SECRET_KEY, &session.to_json()?)?;
        self.update_cache(Some(session.clone()));
        Ok(())
    }

    fn update_cache(&self, session: Option<SessionBundle>) {
        if let Ok(mut cache) = self.cache.write() {
            *cache = session;
        }
    }

    fn get_or_load(&self) -> Result<Option<SessionBundle>, AuthError> {
        if let Ok(cache) = self.cache.read() {
            if let Some(ref session) = *cache {
                return Ok(Some(session.clone()));
            }
        }

        let session = self.load_session()?;
        if let Some(ref s) = session {
            self.update_cache(Some(s.clone()));
        }
        Ok(session)
    }

    /// The stored session, if any.
    pub fn session(&self) -> Option<SessionBundle> {
        self.get_or_load().ok().flatten()
    }

    /// Run the interactive sign-in and store the resulting session.
    pub async fn sign_in(&self) -> Result<SessionBundle, AuthError> {
        let grant = self.identity.request_token(PromptMode::Interactive).await?;
        let session = SessionBundle::from_grant(&self.client_id, grant);
        self.save_session(&session)?;
        tracing::info!("signed in");
        Ok(session)
    }

    /// Renew the access token with the stored refresh token.
    pub async fn refresh(&self) -> Result<SessionBundle, AuthError> {
        let session = self.get_or_load()?.ok_or(AuthError::NotAuthenticated)?;
        let refresh_token = session
            .tokens
            .refresh_token
            .clone()
            .ok_or(AuthError::Expired)?;

        let grant = self
            .identity
            .request_token(PromptMode::Silent { refresh_token })
            .await?;
        let renewed = session.with_refreshed_tokens(grant);
        self.save_session(&renewed)?;
        tracing::debug!(due = %renewed.refresh_due_at(), "session renewed");
        Ok(renewed)
    }

    /// Revoke and forget the stored session.
    ///
    /// Revocation failures are logged; the local session is cleared either
    /// way. Returns `false` when there was nothing to sign out of.
    pub async fn sign_out(&self) -> Result<bool, AuthError> {
        let Some(session) = self.get_or_load()? else {
            return Ok(false);
        };

        let token = session
            .tokens
            .refresh_token
            .as_deref()
            .unwrap_or(&session.tokens.access_token);
        if let Err(e) = self.identity.revoke(token).await {
            tracing::warn!(error = %e, "token revocation failed; clearing local session anyway");
        }

        self.store.delete(SESSION_SECRET_KEY)?;
        self.update_cache(None);
        tracing::info!("signed out");
        Ok(true)
    }
}

#[async_trait::async_trait]
impl TokenProvider for SessionManager {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        let session = self.get_or_load()?.ok_or(AuthError::NotAuthenticated)?;

        if !session.needs_refresh() {
            return Ok(session.tokens.access_token);
        }
        if !session.can_refresh() {
            return Err(AuthError::Expired);
        }
        Ok(self.refresh().await?.tokens.access_token)
    }

    fn is_authenticated(&self) -> bool {
        self.session().is_some_and(|s| s.is_valid())
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("client_id", &self.client_id)
            .field("is_authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenGrant;
    use crate::secrets::MemorySecretStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Identity provider answering from a script.
    #[derive(Default)]
    struct ScriptedIdentity {
        grant_expires_in: u64,
        refresh_fails: bool,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedIdentity {
        fn new(grant_expires_in: u64) -> Self {
            Self {
                grant_expires_in,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IdentityProvider for ScriptedIdentity {
        async fn request_token(&self, mode: PromptMode) -> Result<TokenGrant, AuthError> {
            match mode {
                PromptMode::Interactive => {
                    self.calls.lock().unwrap().push("interactive".into());
                    Ok(TokenGrant::new(
                        "ya29.first",
                        self.grant_expires_in,
                        Some("1//refresh".into()),
                    ))
                }
                PromptMode::Silent { refresh_token } => {
                    self.calls
                        .lock()
                        .unwrap()
                        .push(format!("silent:{}", refresh_token));
                    if self.refresh_fails {
                        return Err(AuthError::Expired);
                    }
                    Ok(TokenGrant::new("ya29.renewed", 3600, None))
                }
            }
        }

        async fn revoke(&self, token: &str) -> Result<(), AuthError> {
            self.calls.lock().unwrap().push(format!("revoke:{}", token));
            Ok(())
        }
    }

    fn manager(identity: Arc<ScriptedIdentity>) -> SessionManager {
        SessionManager::new("client-1", identity, Box::new(MemorySecretStore::new()))
    }

    #[tokio::test]
    async fn not_signed_in() {
        let m = manager(Arc::new(ScriptedIdentity::new(3600)));
        assert!(!m.is_authenticated());
        assert!(matches!(
            m.bearer_token().await,
            Err(AuthError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn sign_in_stores_session() {
        let identity = Arc::new(ScriptedIdentity::new(3600));
        let m = manager(identity.clone());

        m.sign_in().await.unwrap();

        assert!(m.is_authenticated());
        assert_eq!(m.bearer_token().await.unwrap(), "ya29.first");
        assert_eq!(identity.calls(), vec!["interactive"]);
    }

    #[tokio::test]
    async fn due_token_is_refreshed_silently() {
        let identity = Arc::new(ScriptedIdentity::new(0));
        let m = manager(identity.clone());
        m.sign_in().await.unwrap();

        assert_eq!(m.bearer_token().await.unwrap(), "ya29.renewed");
        assert_eq!(identity.calls(), vec!["interactive", "silent:1//refresh"]);

        let session = m.session().unwrap();
        assert_eq!(session.tokens.refresh_token.as_deref(), Some("1//refresh"));
        assert!(session.is_token_valid());
    }

    #[tokio::test]
    async fn short_token_used_until_renewal_is_due() {
        let identity = Arc::new(ScriptedIdentity::new(400));
        let m = manager(identity.clone());
        m.sign_in().await.unwrap();

        assert_eq!(m.bearer_token().await.unwrap(), "ya29.first");
        assert_eq!(identity.calls(), vec!["interactive"]);
    }

    #[tokio::test]
    async fn failed_refresh_surfaces_error() {
        let identity = Arc::new(ScriptedIdentity {
            grant_expires_in: 0,
            refresh_fails: true,
            ..Default::default()
        });
        let m = manager(identity);
        m.sign_in().await.unwrap();

        let err = m.bearer_token().await.unwrap_err();
        assert!(err.needs_reauth());
    }

    #[tokio::test]
    async fn sign_out_revokes_and_clears() {
        let identity = Arc::new(ScriptedIdentity::new(3600));
        let m = manager(identity.clone());
        m.sign_in().await.unwrap();

        assert!(m.sign_out().await.unwrap());
        assert!(!m.is_authenticated());
        assert!(m.session().is_none());
        assert_eq!(identity.calls(), vec!["interactive", "revoke:1//refresh"]);

        assert!(!m.sign_out().await.unwrap());
    }

    #[tokio::test]
    async fn session_survives_new_manager() {
        let identity = Arc::new(ScriptedIdentity::new(3600));
        let store = Arc::new(MemorySecretStore::new());

        struct Shared(Arc<MemorySecretStore>);
        impl SecretStore for Shared {
            fn get(&self, key: &str) -> Result<Option<String>, crate::secrets::SecretError> {
                self.0.get(key)
            }
            fn set(&self, key: &str, value: &str) -> Result<(), crate::secrets::SecretError> {
                self.0.set(key, value)
            }
            fn delete(&self, key: &str) -> Result<(), crate::secrets::SecretError> {
                self.0.delete(key)
            }
        }

        SessionManager::new("client-1", identity.clone(), Box::new(Shared(store.clone())))
            .sign_in()
            .await
            .unwrap();

        let reopened = SessionManager::new("client-1", identity, Box::new(Shared(store)));
        assert!(reopened.is_authenticated());
    }

    #[tokio::test]
    async fn debug_output_does_not_expose_tokens() {
        let m = manager(Arc::new(ScriptedIdentity::new(3600)));
        m.sign_in().await.unwrap();
        let out = format!("{:?}", m);
        assert!(out.contains("client-1"));
        assert!(!out.contains("ya29"));
    }
}
