use tracing::Subscriber;
use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
    EnvFilter,
};

pub use tracing::Level;

pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Install the process-wide subscriber.
///
/// `RUST_LOG` wins when set; otherwise events at `level` and above are kept.
/// ANSI colours are only used when stderr is a terminal. Fails if a global
/// subscriber is already installed.
pub fn init(level: Level) -> Result<(), InitError> {
    tracing_subscriber::registry()
        .with(env_filter(level)?)
        .with(fmt_layer(std::io::stderr, is_tty()))
        .try_init()?;

    Ok(())
}

/// Filter from `RUST_LOG`, falling back to `level`
pub fn env_filter(level: Level) -> Result<EnvFilter, InitError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(level.as_str().to_lowercase())?),
    }
}

/// Formatting layer shared by [`init`] and [`writer_subscriber`]
pub fn fmt_layer<S, W>(writer: W, ansi: bool) -> fmt::Layer<S, DefaultFields, Format, W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_level(true)
        .with_target(true)
        .with_thread_ids(true)
}

/// Subscriber writing plain text at `level` and above into `writer`,
/// ignoring `RUST_LOG`. Meant for `tracing::subscriber::set_default` in tests
/// that assert on log output.
pub fn writer_subscriber<W>(level: Level, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(fmt_layer(writer, false))
}

fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}
