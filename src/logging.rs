use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "xpv=info",
        1 => "xpv=debug",
        _ => "xpv=trace",
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `verbosity`.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::default_directive;

    #[test]
    fn verbosity_raises_the_default_level() {
        assert_eq!(default_directive(0), "xpv=info");
        assert_eq!(default_directive(1), "xpv=debug");
        assert_eq!(default_directive(4), "xpv=trace");
    }
}
