//! Build metadata kept outside the core logic.

/// Version string including the commit hash and build timestamp when the
/// packaging environment injects `SSM_GATHER_COMMIT` and
/// `SSM_GATHER_BUILD_TIMESTAMP` at compile time.
pub fn long() -> String {
    let commit = option_env!("SSM_GATHER_COMMIT").unwrap_or("n/a");
    let built = option_env!("SSM_GATHER_BUILD_TIMESTAMP").unwrap_or("n/a");
    format!(
        "{}\ncommit hash: {commit}\nbuild timestamp: {built}",
        env!("CARGO_PKG_VERSION")
    )
}
