use crate::auth::{Account, CredentialError, CredentialStore, Role, password_digest};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct UserFile {
    users: Vec<UserEntry>,
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    username: String,
    password_blake3: String,
    #[serde(default = "default_role")]
    role: Role,
}

const fn default_role() -> Role {
    Role::User
}

/// Accounts kept in a JSON file:
///
/// ```json
/// {"users": [{"username": "alice", "password_blake3": "<hex>", "role": "admin"}]}
/// ```
///
/// The file is re-read on every lookup, so edits apply without a restart.
#[derive(Debug, Clone)]
pub struct JsonUserFile {
    path: PathBuf,
}

impl JsonUserFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for JsonUserFile {
    async fn lookup(&self, username: &str, password: &str) -> Result<Option<Account>, CredentialError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let file: UserFile = serde_json::from_str(&text)?;
        let Some(entry) = file.users.into_iter().find(|u| u.username == username) else {
            debug!(username, "user not in user file");
            return Ok(None);
        };
        let stored = blake3::Hash::from_hex(&entry.password_blake3).map_err(|source| {
            CredentialError::InvalidDigest {
                username: entry.username.clone(),
                source,
            }
        })?;
        Ok((stored == password_digest(password)).then(|| Account {
            username: entry.username,
            role: entry.role,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_users(dir: &Path, users: serde_json::Value) -> PathBuf {
        let path = dir.join("users.json");
        std::fs::write(&path, json!({ "users": users }).to_string()).expect("write user file");
        path
    }

    #[tokio::test]
    async fn test_lookup_checks_digest_and_role() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_users(
            dir.path(),
            json!([
                {"username": "alice", "password_blake3": password_digest("pw").to_hex().to_string(), "role": "admin"},
                {"username": "bob", "password_blake3": password_digest("pw2").to_hex().to_string()},
            ]),
        );
        let store = JsonUserFile::new(path);

        let alice = store.lookup("alice", "pw").await.expect("lookup");
        assert_eq!(alice.map(|a| a.role), Some(Role::Admin));
        let bob = store.lookup("bob", "pw2").await.expect("lookup");
        assert_eq!(bob.map(|a| a.role), Some(Role::User));
        assert_eq!(store.lookup("alice", "wrong").await.expect("lookup"), None);
        assert_eq!(store.lookup("carol", "pw").await.expect("lookup"), None);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = JsonUserFile::new(dir.path().join("absent.json"));
        assert!(matches!(
            store.lookup("alice", "pw").await,
            Err(CredentialError::Io(_))
        ));
    }
}
