use crate::auth::{Account, CredentialError, CredentialStore, Role, password_digest};
use std::collections::HashMap;

/// Accounts fixed at startup, usually a single configured admin.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    accounts: HashMap<String, (blake3::Hash, Role)>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account from a plaintext password. Only the digest is kept.
    #[must_use]
    pub fn with_account(mut self, username: impl Into<String>, password: &str, role: Role) -> Self {
        self.accounts
            .insert(username.into(), (password_digest(password), role));
        self
    }

    /// Adds an account from a hex BLAKE3 digest.
    pub fn with_digest(
        mut self,
        username: impl Into<String>,
        digest_hex: &str,
        role: Role,
    ) -> Result<Self, CredentialError> {
        let username = username.into();
        let digest = blake3::Hash::from_hex(digest_hex).map_err(|source| {
            CredentialError::InvalidDigest {
                username: username.clone(),
                source,
            }
        })?;
        self.accounts.insert(username, (digest, role));
        Ok(self)
    }

    pub fn check(&self, username: &str, password: &str) -> Option<Account> {
        let (digest, role) = self.accounts.get(username)?;
        // blake3::Hash equality is constant time.
        (*digest == password_digest(password)).then(|| Account {
            username: username.to_string(),
            role: *role,
        })
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl CredentialStore for StaticCredentials {
    async fn lookup(&self, username: &str, password: &str) -> Result<Option<Account>, CredentialError> {
        Ok(self.check(username, password))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_plaintext_account() {
        let store = StaticCredentials::new().with_account("admin", "hunter2", Role::Admin);
        assert_eq!(
            store.check("admin", "hunter2"),
            Some(Account {
                username: "admin".to_string(),
                role: Role::Admin,
            })
        );
        assert_eq!(store.check("admin", "hunter3"), None);
        assert_eq!(store.check("root", "hunter2"), None);
    }

    #[test]
    fn test_with_digest() {
        let hex = password_digest("s3cret").to_hex().to_string();
        let store = StaticCredentials::new()
            .with_digest("viewer", &hex, Role::User)
            .expect("valid digest");
        assert_eq!(store.check("viewer", "s3cret").map(|a| a.role), Some(Role::User));

        let bad = StaticCredentials::new().with_digest("viewer", "not-hex", Role::User);
        assert!(matches!(bad, Err(CredentialError::InvalidDigest { .. })));
    }
}
