//! Log output for the command-line client.
//!
//! Library code only emits `log` records; installing a logger is left to the
//! binary, which calls [`init_logger_with`] once at startup.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::{Level, LevelFilter};

/// Dependencies whose chatter is capped regardless of the requested level.
const DEPENDENCY_CEILINGS: &[(&str, LevelFilter)] = &[
    ("html5ever", LevelFilter::Error),
    ("selectors", LevelFilter::Warn),
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
];

/// Installs the process-wide logger.
///
/// `RUST_LOG` directives are applied first, so a bare `RUST_LOG` can still
/// raise individual dependencies. `level` then sets the default and the level
/// for this crate.
///
/// ```bash
/// RUST_LOG=reqwest=debug tlsbatch --log-level trace https://example.com
/// tlsbatch --log-format json https://a.test/ https://b.test/
/// ```
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (module, ceiling) in DEPENDENCY_CEILINGS {
        builder.filter_module(module, (*ceiling).min(level));
    }
    builder.filter_module(env!("CARGO_PKG_NAME"), level);

    match format {
        LogFormat::Json => builder.format(|buf, record| {
            let line = json_line(
                chrono::Utc::now().timestamp_millis(),
                record.level(),
                record.target(),
                &record.args().to_string(),
            );
            writeln!(buf, "{line}")
        }),
        LogFormat::Plain => {
            // Colours stay on when stderr is redirected to a file.
            colored::control::set_override(true);
            builder.format(|buf, record| {
                let line = plain_line(record.level(), record.target(), &record.args().to_string());
                writeln!(buf, "{line}")
            })
        }
    };

    builder.try_init()?;
    Ok(())
}

/// One JSON object per record: `ts` in epoch milliseconds, then level,
/// target and message.
fn json_line(timestamp_ms: i64, level: Level, target: &str, message: &str) -> String {
    serde_json::json!({
        "ts": timestamp_ms,
        "level": level.as_str(),
        "target": target,
        "msg": message,
    })
    .to_string()
}

fn plain_line(level: Level, target: &str, message: &str) -> String {
    let (marker, tag) = level_style(level);
    format!("{marker} {} [{tag}] {message}", target.cyan())
}

fn level_style(level: Level) -> (&'static str, ColoredString) {
    let tag = level.as_str();
    match level {
        Level::Error => ("❌", tag.red()),
        Level::Warn => ("⚠️", tag.yellow()),
        Level::Info => ("✔️", tag.green()),
        Level::Debug => ("🔍", tag.blue()),
        Level::Trace => ("🔬", tag.purple()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_json_line_escapes_message() {
        let line = json_line(
            1_700_000_000_000,
            Level::Warn,
            "tlsbatch::dispatch",
            "bad \"quote\"\nnext",
        );

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["ts"], 1_700_000_000_000_i64);
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["target"], "tlsbatch::dispatch");
        assert_eq!(value["msg"], "bad \"quote\"\nnext");
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_plain_line_layout() {
        let line = plain_line(Level::Info, "tlsbatch::session", "ready");
        assert!(line.starts_with("✔️ "));
        assert!(line.contains("tlsbatch::session"));
        assert!(line.contains("INFO"));
        assert!(line.ends_with("] ready"));
    }

    #[test]
    fn test_each_level_has_its_own_marker() {
        let levels = [Level::Error, Level::Warn, Level::Info, Level::Debug, Level::Trace];
        let markers: HashSet<_> = levels.iter().map(|level| level_style(*level).0).collect();
        assert_eq!(markers.len(), levels.len());
    }

    #[test]
    fn test_dependency_ceilings_are_info_or_quieter() {
        for (module, ceiling) in DEPENDENCY_CEILINGS {
            assert!(*ceiling <= LevelFilter::Info, "{module} allows {ceiling}");
        }
    }

    #[test]
    fn test_second_install_reports_logger_error() {
        let _ = env_logger::try_init();

        match init_logger_with(LevelFilter::Debug, LogFormat::Plain) {
            Err(InitializationError::LoggerError(_)) => {}
            other => panic!("expected logger error, got {other:?}"),
        }
    }
}
