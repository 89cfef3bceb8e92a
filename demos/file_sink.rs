use jx_logging::env::{JX_LOG_FILE, JX_LOG_LEVEL};
use jx_logging::logger;

/// Writes one record per level to the console and to a JSON file, then
/// exits through `fatal`.
fn main() {
    let path = std::env::temp_dir().join(format!("jx-logging-demo.{}.log", std::process::id()));

    std::env::set_var(JX_LOG_LEVEL, "debug");
    std::env::set_var(JX_LOG_FILE, &path);

    logger().debug("Debug");
    logger().info("Info");
    logger().with_field("path", path.display().to_string()).warn("Warn");
    logger().error("Error");
    logger().fatal("Fatal");
}
