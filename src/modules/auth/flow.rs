use super::accounts::{Account, AccountStore, AuthError, RegistrationForm};
use super::session::Session;

/// States of the authentication flow. `Login` is the initial state; a
/// successful login exits the machine entirely into the authenticated
/// application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Login,
    Register,
    Forgot,
    /// Holds the found account's question for display; the answer is never
    /// carried here
    Reset {
        username: String,
        question: String,
    },
    DeleteAccount,
}

/// Outcome of a delete-account submission
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// The auth flow state machine. Every guard failure is locally recovered:
/// the error is returned for display and the state is left unchanged, so the
/// user can simply resubmit.
pub struct AuthFlow {
    state: AuthState,
}

impl Default for AuthFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthFlow {
    pub fn new() -> Self {
        Self {
            state: AuthState::Login,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn goto_register(&mut self) {
        self.state = AuthState::Register;
    }

    pub fn goto_forgot(&mut self) {
        self.state = AuthState::Forgot;
    }

    pub fn goto_delete_account(&mut self) {
        self.state = AuthState::DeleteAccount;
    }

    /// "Back" from any state discards form state and returns to login
    pub fn back_to_login(&mut self) {
        self.state = AuthState::Login;
    }

    /// Submit login credentials. Success hands a session to the caller,
    /// which exits the machine; failure stays in `Login`.
    pub fn submit_login(
        &self,
        store: &AccountStore,
        username: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        store.authenticate(username, password)
    }

    /// Submit a registration. Success returns to `Login`; failure stays in
    /// `Register` with the specific validation error.
    pub fn submit_registration(
        &mut self,
        store: &mut AccountStore,
        form: &RegistrationForm,
        configured_admin_key: Option<&str>,
    ) -> Result<Account, AuthError> {
        let account = store.register(form, configured_admin_key)?;
        self.state = AuthState::Login;
        Ok(account)
    }

    /// Submit a username search. Found moves to `Reset` carrying the stored
    /// question; not found stays in `Forgot`.
    pub fn submit_forgot(
        &mut self,
        store: &AccountStore,
        username: &str,
    ) -> Result<(), AuthError> {
        let question = store.security_question(username)?;
        self.state = AuthState::Reset {
            username: username.trim().to_string(),
            question,
        };
        Ok(())
    }

    /// Submit a recovery answer plus new passwords. Success returns to
    /// `Login`; any failure stays in `Reset`.
    pub fn submit_reset(
        &mut self,
        store: &mut AccountStore,
        answer: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AuthError> {
        let username = match &self.state {
            AuthState::Reset { username, .. } => username.clone(),
            _ => return Err(AuthError::UnknownUsername),
        };
        store.reset_password(&username, answer, new_password, confirm_password)?;
        self.state = AuthState::Login;
        Ok(())
    }

    /// Submit account deletion. Credentials are verified before the
    /// destructive confirmation is requested; declining cancels with the
    /// account intact.
    pub fn submit_delete(
        &mut self,
        store: &mut AccountStore,
        username: &str,
        password: &str,
        confirm: impl FnOnce() -> bool,
    ) -> Result<DeleteOutcome, AuthError> {
        store.authenticate(username, password)?;
        if !confirm() {
            return Ok(DeleteOutcome::Cancelled);
        }
        store.delete_account(username, password)?;
        self.state = AuthState::Login;
        Ok(DeleteOutcome::Deleted)
    }
}
