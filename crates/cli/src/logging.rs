use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Installs the compact stderr subscriber. `RUST_LOG` overrides the
/// verbosity ladder entirely.
pub fn init_logging(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr.with_max_level(tracing::Level::TRACE))
        .with_target(true)
        .with_level(true)
        .compact()
        .init();
}

/// Ladder: quiet runs keep chromiumoxide's CDP chatter at warn, `-v` opens
/// stocksync debug, `-vv` opens debug everywhere.
fn default_filter(verbosity: u8) -> String {
    if verbosity >= 2 {
        return "debug".to_string();
    }
    let base = if verbosity == 1 {
        "info,stocksync=debug"
    } else {
        "info"
    };
    format!("{base},chromiumoxide=warn")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_ladder() {
        assert_eq!(default_filter(0), "info,chromiumoxide=warn");
        assert_eq!(default_filter(1), "info,stocksync=debug,chromiumoxide=warn");
        assert_eq!(default_filter(2), "debug");
        assert_eq!(default_filter(5), "debug");
    }
}
