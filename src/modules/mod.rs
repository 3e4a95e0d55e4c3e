// Declare all modules
pub mod audit;
pub mod auth;
pub mod backup;
pub mod insights;
pub mod inventory;
pub mod storage;
pub mod utils;

// No re-exports here as they're handled in lib.rs
