//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 按 RUST_LOG 初始化日志，未设置时默认 info
pub fn init() {
    init_with_verbose(false);
}

/// verbose 为 true 且未设置 RUST_LOG 时使用 debug 级别；重复调用无副作用
pub fn init_with_verbose(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
