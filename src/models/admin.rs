use serde::{Deserialize, Serialize};

use super::{Collection, Entity};

/// Admin login credentials. Compared as plaintext.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminCredential {
    pub username: String,
    pub password: String,
}

impl AdminCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Exact, case-sensitive match on both fields.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl std::fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredential")
            .field("username", &self.username)
            .finish()
    }
}

impl Entity for AdminCredential {
    const COLLECTION: Collection = Collection::AdminCredentials;
}
