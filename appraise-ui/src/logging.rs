//! Tracing subscriber setup
//!
//! The subscriber is installed before configuration is loaded so that config
//! resolution itself is logged. The level can only come from the command
//! line or environment at that point; a level from the TOML file is applied
//! afterwards through a reload handle. `RUST_LOG` always wins.

use appraise_common::config::DEFAULT_LOG_LEVEL;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directives for the crates that log at `level`
pub fn log_directives(level: &str) -> String {
    format!("appraise_ui={level},appraise_common={level},tower_http={level}")
}

/// Handle for adjusting the level once configuration is resolved
pub struct LogControl {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogControl {
    /// Switch to the resolved log level, unless `RUST_LOG` is in charge
    pub fn apply_level(&self, level: &str) -> anyhow::Result<()> {
        if self.from_env {
            return Ok(());
        }
        self.handle.reload(EnvFilter::new(log_directives(level)))?;
        Ok(())
    }
}

/// Build the subscriber without installing it
///
/// `env_filter` is the filter parsed from `RUST_LOG`, if any.
pub fn build_subscriber<W>(
    env_filter: Option<EnvFilter>,
    bootstrap_level: Option<&str>,
    writer: W,
) -> (impl Subscriber + Send + Sync + 'static, LogControl)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let from_env = env_filter.is_some();
    let filter = env_filter.unwrap_or_else(|| {
        EnvFilter::new(log_directives(bootstrap_level.unwrap_or(DEFAULT_LOG_LEVEL)))
    });
    let (filter, handle) = reload::Layer::new(filter);

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(writer));

    (subscriber, LogControl { handle, from_env })
}

/// Install the global subscriber writing to stdout
pub fn init(bootstrap_level: Option<&str>) -> LogControl {
    let (subscriber, control) = build_subscriber(
        EnvFilter::try_from_default_env().ok(),
        bootstrap_level,
        std::io::stdout,
    );
    subscriber.init();
    control
}
