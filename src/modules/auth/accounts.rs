use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::password::{generate_salt, hash_password, validate_password, verify_password};
use super::session::Session;
use crate::modules::storage::{KeyValueBackend, StoreError};
use crate::modules::utils::time;
use crate::ACCOUNTS_KEY;

/// The two account roles. ADM may mutate inventory and view the audit log;
/// VISITOR may only view and withdraw.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "ADM")]
    Adm,
    #[serde(rename = "VISITOR")]
    Visitor,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Adm => write!(f, "ADM"),
            Role::Visitor => write!(f, "VISITOR"),
        }
    }
}

impl Role {
    pub fn can_mutate_inventory(&self) -> bool {
        matches!(self, Role::Adm)
    }

    pub fn can_view_audit_log(&self) -> bool {
        matches!(self, Role::Adm)
    }
}

/// Represents a single registered account
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Account {
    pub username: String,            // Original username as entered (for display)
    pub username_normalized: String, // Lowercase version for lookups and comparisons
    pub password_salt: String,       // Hex-encoded per-account salt
    pub password_hash: String,       // Hex-encoded PBKDF2 hash
    pub security_question: String,
    pub security_answer: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Everything a registration submission carries
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub security_question: String,
    pub security_answer: String,
    pub admin_key: String,
}

/// Errors produced by credential-store operations. Every variant is
/// recoverable: the caller shows the message and stays interactive.
#[derive(Debug)]
pub enum AuthError {
    MissingFields,
    PasswordTooShort,
    PasswordMismatch,
    InvalidAdminKey,
    UsernameTaken,
    UnknownUsername,
    WrongPassword,
    WrongSecurityAnswer,
    Storage(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        AuthError::Storage(error)
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingFields => write!(f, "All required fields must be filled in"),
            AuthError::PasswordTooShort => write!(f, "Password must be at least 4 characters"),
            AuthError::PasswordMismatch => write!(f, "Passwords do not match"),
            AuthError::InvalidAdminKey => {
                write!(f, "Invalid admin key. Leave it blank to register as a visitor")
            }
            AuthError::UsernameTaken => write!(f, "This username is already in use"),
            AuthError::UnknownUsername => write!(f, "No account found for that username"),
            AuthError::WrongPassword => write!(f, "Incorrect password. Check your credentials"),
            AuthError::WrongSecurityAnswer => write!(f, "Incorrect security answer"),
            AuthError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

/// Credential store keyed by normalized username, persisted under the
/// `accounts` storage key
pub struct AccountStore {
    backend: Arc<dyn KeyValueBackend>,
    accounts: HashMap<String, Account>,
}

impl AccountStore {
    /// Load the account list from the backend, starting empty when the key
    /// has never been written
    pub fn load(backend: Arc<dyn KeyValueBackend>) -> Result<Self, StoreError> {
        let accounts = match backend.read(ACCOUNTS_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| StoreError::InvalidData(format!("accounts: {}", e)))?,
            None => HashMap::new(),
        };
        Ok(Self { backend, accounts })
    }

    /// Re-read the backing key, discarding in-memory state. Idempotent.
    pub fn refresh(&mut self) -> Result<(), StoreError> {
        match self.backend.read(ACCOUNTS_KEY)? {
            Some(raw) => {
                self.accounts = serde_json::from_str(&raw)
                    .map_err(|e| StoreError::InvalidData(format!("accounts: {}", e)))?;
            }
            None => self.accounts.clear(),
        }
        Ok(())
    }

    fn persist(&self) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(&self.accounts)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        self.backend.write(ACCOUNTS_KEY, &data)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Case-insensitive lookup
    pub fn find(&self, username: &str) -> Option<&Account> {
        self.accounts.get(&normalize(username))
    }

    /// Register a new account. The admin key rule: blank grants VISITOR, a
    /// match against the configured key grants ADM, anything else is
    /// rejected with an error distinct from `UsernameTaken`.
    pub fn register(
        &mut self,
        form: &RegistrationForm,
        configured_admin_key: Option<&str>,
    ) -> Result<Account, AuthError> {
        let username = form.username.trim();
        if username.is_empty()
            || form.password.is_empty()
            || form.security_question.trim().is_empty()
            || form.security_answer.trim().is_empty()
        {
            return Err(AuthError::MissingFields);
        }

        let role = if form.admin_key.is_empty() {
            Role::Visitor
        } else if configured_admin_key == Some(form.admin_key.as_str()) {
            Role::Adm
        } else {
            return Err(AuthError::InvalidAdminKey);
        };

        validate_password(&form.password).map_err(|_| AuthError::PasswordTooShort)?;

        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let normalized = normalize(username);
        if self.accounts.contains_key(&normalized) {
            return Err(AuthError::UsernameTaken);
        }

        let salt = generate_salt();
        let account = Account {
            username: username.to_string(),
            username_normalized: normalized.clone(),
            password_hash: hash_password(&form.password, &salt),
            password_salt: hex::encode(salt),
            security_question: form.security_question.trim().to_string(),
            security_answer: form.security_answer.trim().to_string(),
            role,
            created_at: time::now(),
        };

        self.accounts.insert(normalized, account.clone());
        self.persist()?;
        Ok(account)
    }

    /// Authenticate a submission. The unknown-username/wrong-password split
    /// exists for local user messaging only.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let account = self
            .accounts
            .get(&normalize(username))
            .ok_or(AuthError::UnknownUsername)?;

        if !verify_password(password, &account.password_salt, &account.password_hash) {
            return Err(AuthError::WrongPassword);
        }

        Ok(Session {
            username: account.username.clone(),
            role: account.role,
        })
    }

    /// Begin password recovery: return the stored question text, never the
    /// answer
    pub fn security_question(&self, username: &str) -> Result<String, AuthError> {
        self.accounts
            .get(&normalize(username))
            .map(|a| a.security_question.clone())
            .ok_or(AuthError::UnknownUsername)
    }

    /// Replace the stored password when the security answer matches
    /// (case-insensitively) and the new passwords agree
    pub fn reset_password(
        &mut self,
        username: &str,
        answer: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        let normalized = normalize(username);
        let account = self
            .accounts
            .get(&normalized)
            .ok_or(AuthError::UnknownUsername)?;

        if answer.trim().to_lowercase() != account.security_answer.to_lowercase() {
            return Err(AuthError::WrongSecurityAnswer);
        }

        if new_password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        validate_password(new_password).map_err(|_| AuthError::PasswordTooShort)?;

        let salt = generate_salt();
        let new_hash = hash_password(new_password, &salt);
        if let Some(account) = self.accounts.get_mut(&normalized) {
            account.password_salt = hex::encode(salt);
            account.password_hash = new_hash;
        }
        self.persist()?;
        Ok(())
    }

    /// Remove an account after an exact credential match. Historical
    /// withdrawal and audit records keep the username as a plain string.
    pub fn delete_account(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        let normalized = normalize(username);
        let account = self
            .accounts
            .get(&normalized)
            .ok_or(AuthError::UnknownUsername)?;

        if !verify_password(password, &account.password_salt, &account.password_hash) {
            return Err(AuthError::WrongPassword);
        }

        self.accounts.remove(&normalized);
        self.persist()?;
        Ok(())
    }
}

fn normalize(username: &str) -> String {
    username.trim().to_lowercase()
}
