use crate::auth::{Account, CredentialStore, StaticCredentials};
use tracing::{debug, warn};

/// Checks a primary store first, then the static fallback.
#[derive(Debug, Clone)]
pub struct CredentialResolver<P> {
    primary: Option<P>,
    fallback: StaticCredentials,
}

impl<P: CredentialStore> CredentialResolver<P> {
    pub fn new(primary: Option<P>, fallback: StaticCredentials) -> Self {
        Self { primary, fallback }
    }

    /// The matching account, if any.
    ///
    /// A primary hit wins. A primary miss or error falls through to the static
    /// accounts; errors are logged and otherwise swallowed.
    pub async fn resolve(&self, username: &str, password: &str) -> Option<Account> {
        if let Some(primary) = &self.primary {
            match primary.lookup(username, password).await {
                Ok(Some(account)) => return Some(account),
                Ok(None) => debug!(username, "primary store miss"),
                Err(error) => warn!(username, %error, "primary credential store failed"),
            }
        }
        self.fallback.check(username, password)
    }
}

impl CredentialResolver<StaticCredentials> {
    /// A resolver with no primary store.
    pub fn fallback_only(fallback: StaticCredentials) -> Self {
        Self {
            primary: None,
            fallback,
        }
    }
}
