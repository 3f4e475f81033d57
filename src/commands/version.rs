//! Command: print version information.

/// Print the opsync version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    let version = option_env!("OPSYNC_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    println!("opsync {version}");
}
