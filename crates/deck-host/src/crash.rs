//! Crash reporting for the RepoDeck shell.
//!
//! Installs a panic hook that writes a timestamped report file before the
//! default hook runs.

use std::fs;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

/// Whether crash reporting is enabled
static CRASH_REPORTING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Directory to write crash reports
static CRASH_REPORT_DIR: once_cell::sync::OnceCell<PathBuf> = once_cell::sync::OnceCell::new();

/// App name for crash reports
static APP_NAME: once_cell::sync::OnceCell<String> = once_cell::sync::OnceCell::new();

/// Initialize crash reporting and install the panic hook
pub fn init_crash_reporting(enabled: bool, report_dir: &str, app_name: &str) {
    CRASH_REPORTING_ENABLED.store(enabled, Ordering::SeqCst);
    let _ = CRASH_REPORT_DIR.set(PathBuf::from(report_dir));
    let _ = APP_NAME.set(app_name.to_string());

    if enabled {
        if let Err(e) = fs::create_dir_all(report_dir) {
            warn!("Failed to create crash report directory {}: {}", report_dir, e);
        }

        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            handle_panic(panic_info);
            // Preserve normal panic behavior
            default_hook(panic_info);
        }));

        info!("Crash reporting initialized, reports will be written to: {}", report_dir);
    }
}

fn handle_panic(panic_info: &panic::PanicHookInfo) {
    if !CRASH_REPORTING_ENABLED.load(Ordering::SeqCst) {
        return;
    }

    let backtrace = backtrace::Backtrace::new();

    error!("PANIC: {}", panic_info);
    error!("Backtrace:\n{:?}", backtrace);

    if let Some(dir) = CRASH_REPORT_DIR.get() {
        if let Err(e) = write_crash_report(dir, panic_info, &backtrace) {
            error!("Failed to write crash report: {}", e);
        }
    }
}

fn write_crash_report(
    dir: &Path,
    panic_info: &panic::PanicHookInfo,
    backtrace: &backtrace::Backtrace,
) -> std::io::Result<PathBuf> {
    let app_name = APP_NAME.get().map(|s| s.as_str()).unwrap_or("repodeck");
    let timestamp = chrono::Utc::now();
    let filename = format!("crash-{}-{}.txt", app_name, timestamp.format("%Y%m%d-%H%M%S"));
    let filepath = dir.join(&filename);

    let location = panic_info
        .location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
        .unwrap_or_else(|| "unknown location".to_string());

    let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic payload".to_string()
    };

    let hostname = hostname::get()
        .ok()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let report = format!(
        "==== RepoDeck crash report ====\n\
         Application: {}\n\
         Timestamp:   {}\n\
         OS:          {} ({})\n\
         Hostname:    {}\n\
         \n\
         Location:    {}\n\
         Message:     {}\n\
         \n\
         Backtrace:\n{:?}\n",
        app_name,
        timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        std::env::consts::OS,
        std::env::consts::ARCH,
        hostname,
        location,
        message,
        backtrace
    );

    fs::write(&filepath, report)?;

    info!("Crash report written to: {}", filepath.display());
    Ok(filepath)
}

/// Check if crash reporting is enabled
pub fn is_enabled() -> bool {
    CRASH_REPORTING_ENABLED.load(Ordering::SeqCst)
}

/// Get the crash report directory, if configured
pub fn get_report_dir() -> Option<PathBuf> {
    CRASH_REPORT_DIR.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn init_enables_and_creates_report_dir() {
        let temp_dir = env::temp_dir().join("repodeck-crash-test");
        let _ = fs::remove_dir_all(&temp_dir);

        assert!(!is_enabled());

        // Panic handling itself is not exercised here; only initialization.
        init_crash_reporting(true, temp_dir.to_str().unwrap(), "test-app");

        assert!(is_enabled());
        assert!(temp_dir.exists());

        let _ = fs::remove_dir_all(&temp_dir);
    }
}
