//! The process logger keeps retrying its environment configuration until
//! one apply succeeds. Runs in its own binary so the global logger starts
//! unconfigured.

use jx_logging::env::{JX_LOG_FORMAT, JX_LOG_LEVEL};
use jx_logging::{get_level, logger};
use std::env;

#[test]
fn failed_first_configuration_is_retried_on_next_access() {
    env::remove_var(JX_LOG_FORMAT);
    env::set_var(JX_LOG_LEVEL, "bogus");

    assert!(!logger().is_configured());
    assert_eq!(get_level(), "info");

    env::set_var(JX_LOG_LEVEL, "debug");
    assert!(logger().is_configured());
    assert_eq!(get_level(), "debug");

    // Once configured, later environment changes need an explicit reconfigure.
    env::set_var(JX_LOG_LEVEL, "error");
    assert_eq!(get_level(), "debug");
    env::remove_var(JX_LOG_LEVEL);
}
