use std::env;
use std::process;
use std::sync::Arc;

use log::{error, info, warn};

use stockroom::audit::AuditStore;
use stockroom::auth::user_interface::run_auth_flow;
use stockroom::auth::{AccountStore, SessionManager};
use stockroom::backup::run_auto_backup;
use stockroom::inventory::user_interface::{run_session, SessionEnd};
use stockroom::inventory::{InventoryStore, WithdrawalStore};
use stockroom::storage::{FileBackend, KeyValueBackend, MemoryBackend};
use stockroom::utils::logging::initialize_logging;
use stockroom::utils::time;
use stockroom::{ADMIN_KEY_ENV, DATA_DIR_ENV, DEFAULT_DATA_DIR};

fn main() {
    if let Err(e) = initialize_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    let backend: Arc<dyn KeyValueBackend> = match FileBackend::new(&data_dir) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            eprintln!("Could not open data directory '{}': {}", data_dir, e);
            process::exit(1);
        }
    };
    // Sessions live only as long as the process, like the rest of the
    // per-run state.
    let session_backend: Arc<dyn KeyValueBackend> = Arc::new(MemoryBackend::new());
    let sessions = SessionManager::new(Arc::clone(&session_backend));

    let admin_key = env::var(ADMIN_KEY_ENV).ok().filter(|key| !key.is_empty());
    if admin_key.is_none() {
        warn!("{} is not set; registrations can only create VISITOR accounts", ADMIN_KEY_ENV);
    }

    let mut accounts = match AccountStore::load(Arc::clone(&backend)) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Could not load accounts: {}", e);
            process::exit(1);
        }
    };
    let mut items = match InventoryStore::load(Arc::clone(&backend)) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Could not load inventory: {}", e);
            process::exit(1);
        }
    };
    let mut withdrawals = match WithdrawalStore::load(Arc::clone(&backend)) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Could not load withdrawal history: {}", e);
            process::exit(1);
        }
    };
    let mut audit = match AuditStore::load(Arc::clone(&backend)) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Could not load action logs: {}", e);
            process::exit(1);
        }
    };

    // Opportunistic daily backup on startup; a failure here should not
    // keep anyone from logging in.
    match run_auto_backup(
        backend.as_ref(),
        items.items(),
        withdrawals.records(),
        audit.entries(),
        time::now(),
    ) {
        Ok(Some(key)) => info!("Automatic backup written: {}", key),
        Ok(None) => {}
        Err(e) => error!("Automatic backup failed: {}", e),
    }

    println!("Stockroom inventory tracker");

    loop {
        let session = match run_auth_flow(&mut accounts, admin_key.as_deref()) {
            Some(session) => session,
            None => break,
        };
        if let Err(e) = sessions.start(&session) {
            error!("Could not persist session: {}", e);
        }
        println!("\nWelcome, {}!", session.username);

        let end = run_session(&session, &mut items, &mut withdrawals, &mut audit);

        if let Err(e) = sessions.end() {
            error!("Could not clear session: {}", e);
        }
        // The session may have mutated the stores; give the daily backup
        // another chance to run.
        match run_auto_backup(
            backend.as_ref(),
            items.items(),
            withdrawals.records(),
            audit.entries(),
            time::now(),
        ) {
            Ok(Some(key)) => info!("Automatic backup written: {}", key),
            Ok(None) => {}
            Err(e) => error!("Automatic backup failed: {}", e),
        }
        match end {
            SessionEnd::Logout => {
                println!("Logged out.");
                continue;
            }
            SessionEnd::Exit => break,
        }
    }

    println!("Goodbye!");
}
