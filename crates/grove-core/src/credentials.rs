//! Access credential lookup.
//!
//! A [`CredentialProvider`] answers "which token do we use for this user?".
//! `None` means the user has not connected an account. Providers can be
//! chained; the first one that answers wins.

use std::fmt;
use std::sync::Arc;

use grove_db::RecordStore;
use tracing::debug;

use crate::constants::GITHUB_PROVIDER;
use crate::errors::GroveError;
use crate::store_adapter::from_db_error;

// ============================================================================
// AccessToken
// ============================================================================

/// A non-blank access token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token, returning `None` for empty or whitespace-only input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(***)")
    }
}

/// Turn a raw lookup result into a usable token or `CredentialMissing`.
pub fn require_token(user_id: &str, raw: Option<String>) -> Result<AccessToken, GroveError> {
    raw.and_then(AccessToken::new)
        .ok_or_else(|| GroveError::CredentialMissing {
            user_id: user_id.to_string(),
        })
}

// ============================================================================
// Providers
// ============================================================================

/// Source of per-user access tokens.
pub trait CredentialProvider: Send + Sync {
    /// Token for `user_id`, or `None` when the user is not connected.
    fn access_token(&self, user_id: &str) -> Result<Option<String>, GroveError>;
}

/// Same token for every user (e.g. from `--token`).
pub struct StaticCredentials {
    token: String,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn access_token(&self, _user_id: &str) -> Result<Option<String>, GroveError> {
        Ok(Some(self.token.clone()))
    }
}

/// Token read from an environment variable at lookup time.
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvCredentials {
    fn access_token(&self, _user_id: &str) -> Result<Option<String>, GroveError> {
        if self.var.is_empty() {
            return Ok(None);
        }
        Ok(std::env::var(&self.var).ok())
    }
}

/// Token of the GitHub account the user linked in the record store.
pub struct LinkedAccountCredentials {
    store: Arc<dyn RecordStore>,
}

impl LinkedAccountCredentials {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

impl CredentialProvider for LinkedAccountCredentials {
    fn access_token(&self, user_id: &str) -> Result<Option<String>, GroveError> {
        let account = self
            .store
            .find_account(user_id, GITHUB_PROVIDER)
            .map_err(from_db_error)?;
        Ok(account.and_then(|a| a.access_token))
    }
}

/// Tries each provider in order and returns the first usable token.
#[derive(Default)]
pub struct ChainCredentials {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }
}

impl CredentialProvider for ChainCredentials {
    fn access_token(&self, user_id: &str) -> Result<Option<String>, GroveError> {
        for (idx, provider) in self.providers.iter().enumerate() {
            if let Some(token) = provider.access_token(user_id)? {
                if !token.trim().is_empty() {
                    debug!("Credential for `{}` found by provider #{}", user_id, idx);
                    return Ok(Some(token));
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_db::{LinkedAccount, MemoryRecordStore};

    #[test]
    fn test_require_token_rejects_blank() {
        assert!(matches!(
            require_token("u1", None),
            Err(GroveError::CredentialMissing { .. })
        ));
        assert!(matches!(
            require_token("u1", Some(String::new())),
            Err(GroveError::CredentialMissing { .. })
        ));
        assert!(matches!(
            require_token("u1", Some("  \t\n".to_string())),
            Err(GroveError::CredentialMissing { .. })
        ));
        assert_eq!(
            require_token("u1", Some(" ghp_abc ".to_string()))
                .unwrap()
                .as_str(),
            "ghp_abc"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = AccessToken::new("ghp_secret").unwrap();
        assert_eq!(format!("{:?}", token), "AccessToken(***)");
    }

    #[test]
    fn test_linked_account_lookup() {
        let store = Arc::new(MemoryRecordStore::new());
        store
            .upsert_account(LinkedAccount {
                user_id: "alice".to_string(),
                provider: "github".to_string(),
                access_token: Some("gho_linked".to_string()),
            })
            .unwrap();

        let provider = LinkedAccountCredentials::new(store);
        assert_eq!(
            provider.access_token("alice").unwrap().as_deref(),
            Some("gho_linked")
        );
        assert_eq!(provider.access_token("bob").unwrap(), None);
    }

    #[test]
    fn test_chain_skips_blank_tokens() {
        let chain = ChainCredentials::new()
            .with(StaticCredentials::new("   "))
            .with(EnvCredentials::new("GROVE_TEST_UNSET_TOKEN_VAR"))
            .with(StaticCredentials::new("second"));
        assert_eq!(
            chain.access_token("u").unwrap().as_deref(),
            Some("second")
        );
        assert_eq!(ChainCredentials::new().access_token("u").unwrap(), None);
    }
}
