use crate::layer::LoggerLayer;
use crate::logger::Logger;
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Install a global `tracing` subscriber that forwards every event to
/// `logger`.
///
/// **Parameters**
/// - `logger`: the [`Logger`] whose layout, level and hooks render the
///   events.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
pub fn init_tracing(logger: Arc<Logger>) -> Result<(), SetGlobalDefaultError> {
    let subscriber = Registry::default().with(LoggerLayer::new(logger));
    tracing::subscriber::set_global_default(subscriber)
}

/// Forward `tracing` events to the process logger configured from
/// `JX_LOG_*`.
pub fn init_tracing_from_env() -> Result<(), SetGlobalDefaultError> {
    init_tracing(crate::global::handle())
}
