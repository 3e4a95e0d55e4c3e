use chrono::{DateTime, Local, Utc};

/// Current instant, UTC. All stored timestamps use this clock.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a stored timestamp for table display in the operator's local time
pub fn format_for_display(timestamp: DateTime<Utc>) -> String {
    let local: DateTime<Local> = DateTime::from(timestamp);
    local.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Date stamp used to name auto-backup snapshots
pub fn date_stamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}
