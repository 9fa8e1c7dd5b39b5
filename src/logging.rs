//! Logging initialization
//!
//! Debug logging goes to a temp file so the hosting console can keep
//! stdout/stderr for itself. Call once at startup.

use std::path::PathBuf;

/// Initialize logging based on the debug flag.
///
/// Returns the log file path if debug logging is enabled.
pub fn init_logging(debug: bool) -> Option<PathBuf> {
    if !debug {
        // No logging by default (silent operation)
        return None;
    }

    let log_file = tempfile::Builder::new()
        .prefix("mig9s-")
        .suffix(".log")
        .tempfile()
        .map(|f| {
            let path = f.path().to_path_buf();
            // Keep the file alive for the process lifetime; the OS cleans up
            std::mem::forget(f);
            path
        })
        .unwrap_or_else(|_| {
            std::env::temp_dir().join(format!("mig9s-{}.log", std::process::id()))
        });

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&log_file)
    {
        Ok(file) => file,
        Err(_) => return None,
    };

    tracing_subscriber::fmt()
        .with_writer(file)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_ansi(false) // No ANSI codes in log file
        .with_target(true)
        .init();

    Some(log_file)
}
