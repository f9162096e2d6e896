use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Row diagnostics are emitted at `warn`, so they stay visible by default.
/// When `RUST_LOG` is set it alone decides what is shown.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env().ok();
    let app_filter = app_targets(verbose, env_filter.is_some());
    let env_filter = env_filter.unwrap_or_else(|| {
        EnvFilter::new(if verbose { "debug" } else { "warn" })
    });

    tracing_subscriber::registry()
        .with(fmt::layer().without_time().with_writer(std::io::stderr))
        .with(app_filter)
        .with(env_filter)
        .init();
}

fn app_targets(verbose: bool, env_configured: bool) -> Option<Targets> {
    if env_configured {
        return None;
    }
    let level_filter = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    Some(
        Targets::new()
            .with_target("fxledger", level_filter)
            .with_default(LevelFilter::WARN),
    )
}
