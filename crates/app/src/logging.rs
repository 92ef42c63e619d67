use std::io;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Level given with `--log-level`, `info` when absent.
pub(crate) fn level_from_args(args: &[String]) -> Result<LevelFilter, String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--log-level" {
            let value = iter
                .next()
                .ok_or_else(|| "--log-level requires a level".to_string())?;
            return value
                .parse::<LevelFilter>()
                .map_err(|err| format!("invalid log level '{value}': {err}"));
        }
    }
    Ok(LevelFilter::INFO)
}

pub(crate) fn setup_tracing(level: LevelFilter) {
    let filter_layer = tracing_subscriber::filter::filter_fn(move |metadata| {
        let is_serlio = metadata.target().starts_with("serlio");
        let effective_level = if is_serlio { level } else { LevelFilter::WARN };
        match effective_level.into_level() {
            Some(max) => metadata.level() <= &max,
            None => false,
        }
    });
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter_layer))
        .init();
}
