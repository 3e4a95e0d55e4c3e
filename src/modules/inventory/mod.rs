pub mod model;
pub mod store;
pub mod user_interface;
pub mod withdrawals;

pub use model::{Category, InventoryItem, ItemUpdate};
pub use store::InventoryStore;
pub use user_interface::{run_session, SessionEnd};
pub use withdrawals::{register_withdrawal, WithdrawalError, WithdrawalRecord, WithdrawalStore};
