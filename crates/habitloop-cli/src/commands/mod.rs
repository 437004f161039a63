pub mod config;
pub mod habit;
pub mod remind;
pub mod stats;

use habitloop_core::{Config, NotificationBackend, SqliteBackend, UnsupportedBackend};

/// Pick the notification backend for this run: the persistent registry
/// when notifications are enabled, the no-op backend otherwise.
pub fn notification_backend(
    config: &Config,
) -> Result<Box<dyn NotificationBackend>, Box<dyn std::error::Error>> {
    if config.notifications.enabled {
        Ok(Box::new(SqliteBackend::open()?))
    } else {
        Ok(Box::new(UnsupportedBackend))
    }
}
