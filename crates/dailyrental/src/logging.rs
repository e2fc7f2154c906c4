//! Logging setup for the `dailyrental` binary.
//!
//! Filter priority: `-v/-q` flags, then `RUST_LOG`, then the default filter.
//!
//! An explicit `-v/-q` sets the bare level for every target. Flags are
//! detected with `Verbosity::is_present` rather than `log_level()`, because
//! `log_level()` also reports the default level when no flag was given and
//! would shadow `RUST_LOG`.

use anyhow::Result;
use clap_verbosity_flag::{LogLevel, Verbosity};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "dailyrental=info";

pub fn init_logging<L: LogLevel>(verbosity: &Verbosity<L>, default_filter: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(build_filter(verbosity, default_filter)?)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    Ok(())
}

fn build_filter<L: LogLevel>(verbosity: &Verbosity<L>, default_filter: &str) -> Result<EnvFilter> {
    if verbosity.is_present() {
        let level = verbosity.log_level_filter().to_string().to_lowercase();
        Ok(EnvFilter::try_new(level)?)
    } else {
        Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use clap_verbosity_flag::InfoLevel;

    #[derive(Parser)]
    struct Args {
        #[command(flatten)]
        verbosity: Verbosity<InfoLevel>,
    }

    fn filter_for(args: &[&str]) -> String {
        let args = Args::parse_from(args);
        build_filter(&args.verbosity, DEFAULT_FILTER)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_verbose_flag_sets_bare_level() {
        let filter = filter_for(&["dailyrental", "-v"]);
        assert_eq!(filter, "debug");
    }

    #[test]
    fn test_quiet_flags_can_silence_everything() {
        let filter = filter_for(&["dailyrental", "-qqqq"]);
        assert_eq!(filter, "off");
    }
}
