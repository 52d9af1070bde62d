//! Diagnostic logging to stderr, off unless `BINEC_LOG` asks for it.

use anyhow::Context;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

/// Environment variable holding the log level.
pub const LOG_ENV: &str = "BINEC_LOG";

const PATTERN: &str = "{h({l})} {t} - {m}{n}";

/// Parse a level name, treating an unset or empty variable as `off`.
pub fn level_from_env(value: Option<&str>) -> anyhow::Result<LevelFilter> {
    match value.map(str::trim) {
        None | Some("") => Ok(LevelFilter::Off),
        Some(v) => v
            .parse::<LevelFilter>()
            .with_context(|| format!("invalid {LOG_ENV} level '{v}'")),
    }
}

/// Install the stderr logger at the level named by `BINEC_LOG`.
pub fn init() -> anyhow::Result<()> {
    let value = std::env::var(LOG_ENV).ok();
    let level = level_from_env(value.as_deref())?;
    if level == LevelFilter::Off {
        return Ok(());
    }

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
        .context("building log config")?;
    log4rs::init_config(config).context("installing logger")?;
    Ok(())
}
