use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Crate target prefix used to filter only library-originated logs.
pub const TARGET_PREFIX: &str = "ai_llm_service";

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        w.write_str(&now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }
}

/// Build a formatting layer that renders only events whose target starts
/// with one of `prefixes`.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format with `file:line` and target
/// - Span close events (duration of instrumented provider calls)
/// - ANSI colors only when stdout is a terminal
///
/// Compose it in the binary together with the global `EnvFilter`.
pub fn layer<S>(prefixes: &'static [&'static str]) -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();

    let only_ours = filter::filter_fn(move |meta| {
        prefixes.iter().any(|p| meta.target().starts_with(p))
    });

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_ours)
}

/// Level directive for a single crate target, e.g. `ai_llm_service=debug`.
///
/// Returns `None` if `target` is not a valid directive target.
pub fn level_directive(target: &str, level: Level) -> Option<Directive> {
    Directive::from_str(&format!("{target}={}", level.as_str().to_lowercase())).ok()
}

/// EnvFilter from `RUST_LOG` when it is set and valid. Otherwise `default`
/// with a `level` directive added for every target in `targets`.
pub fn env_filter_with_level(default: &str, targets: &[&str], level: Level) -> EnvFilter {
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        return from_env;
    }
    let mut base = EnvFilter::new(default);
    for t in targets {
        if let Some(d) = level_directive(t, level) {
            base = base.add_directive(d);
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_formats_lowercase_level() {
        let d = level_directive(TARGET_PREFIX, Level::DEBUG).unwrap();
        assert_eq!(d.to_string(), "ai_llm_service=debug");
    }
}
