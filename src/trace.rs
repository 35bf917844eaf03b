use tracing_subscriber::EnvFilter;

/// Logging verbosity, independent of `RUST_LOG` so embedding applications
/// can set a sane default without an environment variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Level {
    fn as_filter_str(self) -> &'static str {
        match self {
            Level::Off => "off",
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Trace => "trace",
        }
    }
}

/// Install a `tracing_subscriber::fmt` subscriber for stdout, honoring
/// `RUST_LOG` if set and falling back to `level` otherwise. Intended to be
/// called once, early in `main`; safe to call more than once (later calls
/// are no-ops).
pub fn init_tracing(level: Level) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter_str()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
