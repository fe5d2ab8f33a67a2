//! Client record managed by `ClientRepository`.
//!
//! # Invariants
//! - `id` is `None` until the store assigns one on first save.
//! - A persisted client has non-empty names and an email with one `@`
//!   separating non-empty local and domain parts.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Store-assigned numeric identity.
pub type ClientId = i64;

/// Validation failures for client writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientValidationError {
    EmptyFirstName,
    EmptyLastName,
    InvalidEmail,
}

impl Display for ClientValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFirstName => write!(f, "client first name cannot be empty"),
            Self::EmptyLastName => write!(f, "client last name cannot be empty"),
            Self::InvalidEmail => write!(f, "client email is not a valid address"),
        }
    }
}

impl Error for ClientValidationError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: Option<ClientId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Client {
    /// Creates an unsaved client stamped with the current time.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            created_at: now_epoch_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ClientValidationError::EmptyFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(ClientValidationError::EmptyLastName);
        }
        match self.email.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(())
            }
            _ => Err(ClientValidationError::InvalidEmail),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::{Client, ClientValidationError};

    #[test]
    fn new_client_is_unsaved_and_stamped() {
        let client = Client::new("Ana", "Rios", "ana@example.com");
        assert_eq!(client.id, None);
        assert!(client.created_at > 0);
        assert_eq!(client.full_name(), "Ana Rios");
        assert_eq!(client.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_blank_names_and_bad_email() {
        let blank_first = Client::new("  ", "Rios", "ana@example.com");
        assert_eq!(
            blank_first.validate(),
            Err(ClientValidationError::EmptyFirstName)
        );

        let blank_last = Client::new("Ana", "", "ana@example.com");
        assert_eq!(
            blank_last.validate(),
            Err(ClientValidationError::EmptyLastName)
        );

        for email in ["ana.example.com", "@example.com", "ana@", "a@b@c"] {
            let client = Client::new("Ana", "Rios", email);
            assert_eq!(client.validate(), Err(ClientValidationError::InvalidEmail));
        }
    }
}
