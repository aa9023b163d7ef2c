// SPDX-License-Identifier: MIT

use time::macros::format_description;
use time::UtcOffset;
use tracing::Level;
use tracing_subscriber::fmt::time::OffsetTime;

/// Initialize the global tracing subscriber writing to stderr.
///
/// The local UTC offset must be looked up before any threads are
/// started, so call this early in main.
pub fn init_logger(level: Level) {
    let level = match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    };

    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let timer = OffsetTime::new(
        offset,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    );

    let builder = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(format!("{level},hyper=off,hyper_util=off,reqwest=info"))
        .with_writer(std::io::stderr)
        .with_timer(timer);

    #[cfg(target_os = "windows")]
    let builder = builder.with_ansi(false);

    if let Err(err) = tracing::subscriber::set_global_default(builder.finish()) {
        eprintln!("Failed to set default tracing subscriber: {err}");
    }
}

/// Forward records from the `log` crate into tracing.
pub fn init_stdlog() {
    if let Err(err) = tracing_log::LogTracer::builder()
        .with_max_level(log::LevelFilter::Info)
        .init()
    {
        eprintln!("Failed to initialize log bridge: {err}");
    }
}

pub fn level_from_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_level_from_verbosity() {
        assert_eq!(level_from_verbosity(0), Level::INFO);
        assert_eq!(level_from_verbosity(1), Level::DEBUG);
        assert_eq!(level_from_verbosity(5), Level::TRACE);
    }
}
