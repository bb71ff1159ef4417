use anyhow::Result;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{Level, Subscriber};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const CRATES: [&str; 4] = ["medibook", "medibook_core", "medibook_http", "medibook_session"];

/// Initialize logging for the CLI
///
/// Logs go to stderr, and also to `log_file` when one is given. `RUST_LOG`
/// takes precedence over `level`.
pub fn init_logging(level: Level, log_file: Option<&Path>) -> Result<()> {
    subscriber(level, log_file)?.init();
    Ok(())
}

fn subscriber(
    level: Level,
    log_file: Option<&Path>,
) -> Result<impl Subscriber + Send + Sync + use<>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    Ok(tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        ))
}

fn default_directives(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_cover_every_crate() {
        assert_eq!(
            default_directives(Level::DEBUG),
            "medibook=debug,medibook_core=debug,medibook_http=debug,medibook_session=debug"
        );
    }

    #[test]
    fn test_stderr_only_and_file_stacks_both_build() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("logs/medibook.log");

        let file_logger = subscriber(Level::WARN, Some(&path)).unwrap();
        tracing::subscriber::with_default(file_logger, || {
            tracing::warn!(target: "medibook", "token file unreadable");
        });
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("token file unreadable"));

        let stderr_only = subscriber(Level::INFO, None).unwrap();
        tracing::subscriber::with_default(stderr_only, || {
            tracing::info!(target: "medibook", "stderr only");
        });
    }
}
