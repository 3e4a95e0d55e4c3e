pub mod accounts;
pub mod flow;
pub mod password;
pub mod session;
pub mod user_interface;

// Re-export the main types and functions
pub use accounts::{Account, AccountStore, AuthError, RegistrationForm, Role};
pub use flow::{AuthFlow, AuthState};
pub use password::{hash_password, validate_password, verify_password, PasswordError};
pub use session::{Session, SessionManager};
