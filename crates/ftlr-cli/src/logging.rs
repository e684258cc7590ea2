use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

fn default_directives(verbose: u8) -> &'static str {
    match verbose {
        0 => "ftlr=info,ftlr_core=info",
        1 => "ftlr=debug,ftlr_core=debug",
        _ => "ftlr=trace,ftlr_core=trace",
    }
}

/// Initialises tracing. `FTLR_LOG` wins over the verbosity flag.
pub fn init(verbose: u8) -> Result<(), ParseError> {
    let format_filter = EnvFilter::try_from_env("FTLR_LOG")
        .or_else(|_| EnvFilter::try_new(default_directives(verbose)))?;
    let format_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_writer(std::io::stderr)
        .with_filter(format_filter);

    tracing_subscriber::Registry::default().with(format_layer).init();
    Ok(())
}
