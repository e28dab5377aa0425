use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use moongate_config::{APP_NAME, ProjectPaths};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const MAX_LOG_SIZE: u64 = 1024 * 1024; // 1MB

/// Initialize logging for a component.
///
/// - `component_name`: Name of the component (e.g., "cli", "replay")
/// - `enabled`: If true, also log to `<data dir>/logs/<component>.log`.
///   If false, only console logging.
///
/// Returns a guard that must be kept alive for the duration of the program.
pub fn init_logging(component_name: &str, enabled: bool) -> io::Result<Option<WorkerGuard>> {
    if !enabled {
        tracing_subscriber::fmt()
            .with_env_filter(default_filter())
            .init();
        return Ok(None);
    }

    let log_dir = log_directory()?;
    let (file, log_path) = open_log_file(&log_dir, component_name)?;
    let (non_blocking_file, guard) = tracing_appender::non_blocking(BufWriter::new(file));

    tracing_subscriber::registry()
        .with(default_filter())
        .with(fmt::layer().with_writer(io::stdout).with_ansi(true))
        .with(
            fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    tracing::info!("Logging to file: {}", log_path.display());

    Ok(Some(guard))
}

/// `RUST_LOG` when set, `info` otherwise
fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn log_directory() -> io::Result<PathBuf> {
    ProjectPaths::new(APP_NAME)
        .map(|paths| paths.logs_dir())
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Failed to find home directory"))
}

/// Open `<dir>/<component>.log` for appending, starting over once it passes 1MB
fn open_log_file(dir: &Path, component_name: &str) -> io::Result<(File, PathBuf)> {
    fs::create_dir_all(dir)?;
    let log_path = dir.join(format!("{}.log", component_name));
    truncate_if_needed(&log_path)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    Ok((file, log_path))
}

fn truncate_if_needed(log_path: &Path) -> io::Result<()> {
    if log_path.exists() && fs::metadata(log_path)?.len() > MAX_LOG_SIZE {
        File::create(log_path)?.set_len(0)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_log_file_is_created_under_dir() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");

        let (mut file, path) = open_log_file(&logs, "cli").unwrap();
        writeln!(file, "hello").unwrap();

        assert_eq!(path, logs.join("cli.log"));
        assert!(fs::read_to_string(&path).unwrap().contains("hello"));
    }

    #[test]
    fn test_oversized_log_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay.log");
        fs::write(&path, vec![b'x'; (MAX_LOG_SIZE + 1) as usize]).unwrap();

        let (_file, path) = open_log_file(dir.path(), "replay").unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_small_log_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.log");
        fs::write(&path, "previous run\n").unwrap();

        let (_file, path) = open_log_file(dir.path(), "cli").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous run\n");
    }
}
