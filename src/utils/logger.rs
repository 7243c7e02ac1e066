use colored::{ColoredString, Colorize};
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Colors used for run summaries and report headings.
pub struct Colors;

impl Colors {
    pub const OK: &'static str = "green";
    pub const FAILED: &'static str = "red";
    pub const RETRIED: &'static str = "yellow";
    pub const HEADING: &'static str = "cyan";

    pub fn colorize(color: &str, text: &str) -> ColoredString {
        text.color(color)
    }
}

fn level_tag(level: Level) -> Option<ColoredString> {
    match level {
        Level::Error => Some("ERROR".color(Colors::FAILED)),
        Level::Warn => Some("WARN".color(Colors::RETRIED)),
        Level::Debug | Level::Trace => Some("DEBUG".dimmed()),
        Level::Info => None,
    }
}

/// Crate logs at info (debug when verbose); dependencies only at warn. `RUST_LOG` still wins.
/// Safe to call more than once.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME").color(Colors::HEADING);
            let line = match level_tag(record.level()) {
                Some(tag) => format!(
                    "[{} {} {}] {}",
                    name,
                    tag,
                    record.target().white(),
                    record.args()
                ),
                None => format!("[{}] {}", name, record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .try_init();
}
