//! Username/password checks for the upload endpoint.
//!
//! A [`CredentialResolver`] asks an optional primary store first and falls
//! back to a fixed set of static accounts. Passwords are only ever held as
//! BLAKE3 digests.
pub mod error;
pub mod fallback;
pub mod json_file;
pub mod resolver;

pub use error::CredentialError;
pub use fallback::StaticCredentials;
pub use json_file::JsonUserFile;
pub use resolver::CredentialResolver;

use serde::{Deserialize, Serialize};
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub role: Role,
}

/// A source of accounts.
pub trait CredentialStore: Send + Sync {
    /// `Ok(None)` when the user is unknown or the password is wrong.
    fn lookup(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<Option<Account>, CredentialError>> + Send;
}

/// The digest form passwords are stored and compared in.
pub fn password_digest(password: &str) -> blake3::Hash {
    blake3::hash(password.as_bytes())
}
