/// Sets up env_logger, falling back to `default_level` when `RUST_LOG` is unset.
pub fn init_logging_and_env(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    env_logger::Builder::from_env(env)
        .format_target(false)
        .init();
}
