//! Logging setup
//!
//! One log file per run under `logs/`, plus a short stdout layer. The filter
//! comes from `RUST_LOG` when set. On WASM only the stdout layer exists.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_DIR: &str = "logs";
const LOG_PREFIX: &str = "dino_island";
const KEEP_LOGS: usize = 25;
const DEFAULT_FILTER: &str = "dino_island=info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Short console output; each subscriber stack gets its own instance.
#[cfg(not(target_arch = "wasm32"))]
fn stdout_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer().with_writer(std::io::stdout).with_target(false)
}

#[cfg(not(target_arch = "wasm32"))]
fn file_layer<S>(appender: tracing_appender::rolling::RollingFileAppender) -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer().with_writer(appender).with_ansi(false)
}

/// Install the global subscriber. Returns the log file path, if one was opened.
#[cfg(not(target_arch = "wasm32"))]
pub fn init() -> Option<PathBuf> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};

    let log_dir = PathBuf::from(LOG_DIR);
    if let Err(err) = fs::create_dir_all(&log_dir) {
        tracing_subscriber::registry()
            .with(filter())
            .with(stdout_layer())
            .init();
        tracing::warn!("no log file, cannot create {}: {err}", log_dir.display());
        return None;
    }
    cleanup_old_logs(&log_dir, KEEP_LOGS);

    let filename = format!(
        "{LOG_PREFIX}_{}.log",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    // single file per run, never rotated
    let appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &filename);

    tracing_subscriber::registry()
        .with(filter())
        .with(file_layer(appender))
        .with(stdout_layer())
        .init();

    Some(log_dir.join(filename))
}

#[cfg(target_arch = "wasm32")]
pub fn init() -> Option<PathBuf> {
    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_ansi(false).without_time())
        .init();
    None
}

/// Delete the oldest run logs so at most `keep` remain. Returns how many went.
pub fn cleanup_old_logs(log_dir: &Path, keep: usize) -> usize {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return 0;
    };
    let mut logs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(LOG_PREFIX) && name.ends_with(".log"))
        })
        .collect();
    if logs.len() <= keep {
        return 0;
    }

    // oldest first; the timestamped names sort the same way
    logs.sort_by_key(|e| e.file_name());
    let excess = logs.len() - keep;
    logs.iter()
        .take(excess)
        .filter(|e| fs::remove_file(e.path()).is_ok())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            let name = format!("{LOG_PREFIX}_2024010{i}_120000.log");
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), b"keep me").unwrap();

        assert_eq!(cleanup_old_logs(dir.path(), 3), 2);

        let mut left: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(
            left,
            vec![
                format!("{LOG_PREFIX}_20240102_120000.log"),
                format!("{LOG_PREFIX}_20240103_120000.log"),
                format!("{LOG_PREFIX}_20240104_120000.log"),
                "notes.txt".to_string(),
            ]
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_and_stdout_layers_share_a_stack() {
        use tracing_appender::rolling::{RollingFileAppender, Rotation};

        let dir = tempfile::tempdir().unwrap();
        let appender = RollingFileAppender::new(Rotation::NEVER, dir.path(), "run.log");
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new("info"))
            .with(file_layer(appender))
            .with(stdout_layer());
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("raptor spotted near the beach");
        });

        let text = fs::read_to_string(dir.path().join("run.log")).unwrap();
        assert!(text.contains("raptor spotted near the beach"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_cleanup_missing_dir() {
        assert_eq!(cleanup_old_logs(Path::new("/definitely/not/here"), 3), 0);
    }
}
