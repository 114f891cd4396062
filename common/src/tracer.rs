use clap::Args;
use thiserror::Error;
use tracing::{debug, level_filters::LevelFilter, subscriber::SetGlobalDefaultError};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt};

/// Logging options shared by every binary in the workspace.
#[derive(Debug, Clone, Args)]
pub struct LoggingOpts {
    /// Level used for targets not mentioned in RUST_LOG.
    #[clap(long, default_value = "info", env = "NOVO_LOG_LEVEL")]
    pub log_level: LevelFilter,

    /// Disable ANSI colour codes in the log output.
    #[clap(long)]
    pub no_ansi: bool,
}

impl Default for LoggingOpts {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::INFO,
            no_ansi: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("Cannot install global tracing subscriber: {0}")]
    SetGlobalDefault(#[from] SetGlobalDefaultError),
}

/// Should be called once at the start of each binary.
/// Expands to [TracerEngine::new] with the name of the calling binary.
#[macro_export]
macro_rules! init_tracer {
    ($options:expr) => {
        $crate::TracerEngine::new($options, env!("CARGO_BIN_NAME"))
    };
}

/// Owns the global tracing subscriber of a binary.
///
/// Log lines go to stderr so that stdout remains free for the interactive
/// session and for summaries which may be piped elsewhere.
pub struct TracerEngine {
    service_name: String,
}

impl TracerEngine {
    /// Initialises the stderr tracer.
    /// # Parameters
    /// - options: the caller's logging options.
    /// - service_name: the name of the binary, recorded on the first log line.
    /// # Error Modes
    /// - Fails if a global subscriber has already been installed.
    pub fn new(options: &LoggingOpts, service_name: &str) -> Result<Self, TracerError> {
        // RUST_LOG directives take precedence over the default level.
        let log_filter = EnvFilter::builder()
            .with_default_directive(options.log_level.into())
            .from_env_lossy();

        let stderr_tracer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(!options.no_ansi)
            .with_filter(log_filter);

        let subscriber = tracing_subscriber::Registry::default().with(stderr_tracer);
        tracing::subscriber::set_global_default(subscriber)?;

        debug!(service_name, "Tracer initialised");
        Ok(Self {
            service_name: service_name.to_owned(),
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Cli {
        #[clap(flatten)]
        logging: LoggingOpts,
    }

    #[test]
    fn parse_log_level() {
        let cli = Cli::try_parse_from(["test", "--log-level", "debug", "--no-ansi"])
            .expect("arguments should parse");
        assert_eq!(cli.logging.log_level, LevelFilter::DEBUG);
        assert!(cli.logging.no_ansi);
    }

    #[test]
    fn reject_unknown_log_level() {
        assert!(Cli::try_parse_from(["test", "--log-level", "loud"]).is_err());
    }
}
