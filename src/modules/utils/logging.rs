use env_logger::{Builder, WriteStyle};
use log::{error, info, warn, LevelFilter};
use std::fs::OpenOptions;

/// Name of the process log file. Distinct from the domain action-log store,
/// which records user-visible audit entries.
pub const LOG_FILE: &str = "stockroom.log";

/// Initialize the logging system, writing to the application log file
pub fn initialize_logging() -> Result<(), Box<dyn std::error::Error>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)?;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp_secs()
        .format_module_path(true)
        .write_style(WriteStyle::Auto)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();

    info!("Logging system initialized");
    Ok(())
}

/// Mask a username so the process log never contains full identifiers.
/// Counted in chars, not bytes: usernames like "João" must not split a
/// multi-byte character.
fn mask_username(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Structured logging for authentication events
pub fn log_auth_event(event_type: &str, username: &str, success: bool, details: Option<&str>) {
    if success {
        info!(
            "Auth event: type={}, user={}, success=true, details={:?}",
            event_type,
            mask_username(username),
            details
        );
    } else {
        warn!(
            "Auth event: type={}, user={}, success=false, details={:?}",
            event_type,
            mask_username(username),
            details
        );
    }
}

/// Structured logging for store mutations and exports
pub fn log_store_operation(
    operation: &str,
    user: &str,
    store: &str,
    success: bool,
    details: Option<&str>,
) {
    if success {
        info!(
            "Store operation: op={}, user={}, store={}, success=true, details={:?}",
            operation,
            mask_username(user),
            store,
            details
        );
    } else {
        error!(
            "Store operation: op={}, user={}, store={}, success=false, details={:?}",
            operation,
            mask_username(user),
            store,
            details
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_masking() {
        assert_eq!(mask_username("almirante"), "al***te");
        assert_eq!(mask_username("ana"), "***");
        assert_eq!(mask_username(""), "");
    }

    #[test]
    fn test_username_masking_handles_multibyte_names() {
        // Accented names are routine input; masking must not split a
        // character mid-byte
        assert_eq!(mask_username("João"), "****");
        assert_eq!(mask_username("Joãozinho"), "Jo***ho");
        assert_eq!(mask_username("Conceição"), "Co***ão");
    }
}
