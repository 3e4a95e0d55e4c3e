// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{
    audit,
    auth,
    backup,
    insights,
    inventory,
    storage,
    utils,
};

// Re-export commonly used types
pub use modules::auth::accounts::{Account, AccountStore, Role};
pub use modules::auth::session::{Session, SessionManager};
pub use modules::inventory::model::{Category, InventoryItem};
pub use modules::inventory::store::InventoryStore;

// Durable storage keys
pub const ACCOUNTS_KEY: &str = "accounts";
pub const INVENTORY_KEY: &str = "inventory";
pub const WITHDRAWALS_KEY: &str = "withdrawals";
pub const ACTION_LOGS_KEY: &str = "action_logs";
pub const LAST_BACKUP_KEY: &str = "last_auto_backup";

// Session-scoped storage key
pub const SESSION_KEY: &str = "session";

// Environment configuration
pub const DATA_DIR_ENV: &str = "STOCKROOM_DATA_DIR";
pub const ADMIN_KEY_ENV: &str = "STOCKROOM_ADMIN_KEY";
pub const DEFAULT_DATA_DIR: &str = "data";

// Auto-backups run at most once per this interval
pub const AUTO_BACKUP_INTERVAL_SECS: i64 = 86_400;

// Type aliases
pub type HmacSha256 = hmac::Hmac<sha2::Sha256>;
