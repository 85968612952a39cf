use tracing_subscriber::EnvFilter;

mod command;
mod util;

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .init();
}

/// `--verbose` forces debug output; otherwise `RUST_LOG` applies, falling
/// back to info when it is unset or invalid.
fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn main() -> anyhow::Result<()> {
    command::run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_overrides_environment() {
        assert_eq!(env_filter(true).max_level_hint(), Some(tracing::Level::DEBUG.into()));
    }
}
