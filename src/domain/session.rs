// User session domain model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub email: String,
    pub login_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub email: String,
    pub password: String,
}

/// Allow-list of dashboard users. Emails match case-insensitively.
#[derive(Debug, Clone)]
pub struct CredentialTable {
    entries: Vec<Credential>,
}

impl CredentialTable {
    pub fn new(entries: Vec<Credential>) -> Self {
        let entries = entries
            .into_iter()
            .map(|c| Credential {
                email: c.email.trim().to_lowercase(),
                password: c.password,
            })
            .collect();
        Self { entries }
    }

    pub fn verify(&self, email: &str, password: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.entries
            .iter()
            .any(|c| c.email == email && c.password == password)
    }
}

impl Default for CredentialTable {
    fn default() -> Self {
        let builtin = [
            ("admin@smartrover.com", "admin123"),
            ("operator@smartrover.com", "operator123"),
            ("demo@smartrover.com", "demo123"),
        ];
        Self::new(
            builtin
                .iter()
                .map(|(email, password)| Credential {
                    email: email.to_string(),
                    password: password.to_string(),
                })
                .collect(),
        )
    }
}
