#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a headless Bastion campaign.

mod campaign;
mod config;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use bastion_simulation::Simulation;
use clap::Parser;

use crate::campaign::{Settings, UpgradePolicy};

/// Runs a campaign to completion and prints how it went.
#[derive(Debug, Parser)]
#[command(name = "bastion", version)]
struct CliArgs {
    /// TOML file overriding the default balance values.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for enemy placement, upgrade offers and the random policy.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Simulated milliseconds advanced per tick.
    #[arg(
        long = "dt-ms",
        default_value_t = 16,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    dt_ms: u64,
    /// Upper bound on ticks before the run is abandoned.
    #[arg(long, default_value_t = 500_000)]
    max_ticks: u64,
    /// How level-up choices are resolved.
    #[arg(long, value_enum, default_value_t = UpgradePolicy::First)]
    upgrade_policy: UpgradePolicy,
}

/// Entry point for the Bastion command-line interface.
fn main() -> Result<()> {
    let _ = env_logger::Builder::from_default_env().try_init();
    let args = CliArgs::parse();

    let tuning = config::load(args.config.as_deref())?;
    let simulation =
        Simulation::new(tuning, args.seed).context("failed to set up the campaign")?;
    let settings = Settings {
        dt: Duration::from_millis(args.dt_ms),
        max_ticks: args.max_ticks,
        policy: args.upgrade_policy,
        seed: args.seed,
    };

    let summary = campaign::run(simulation, &settings);
    println!("{summary}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_sixty_hertz_first_choice_run() {
        let args = CliArgs::try_parse_from(["bastion"]).expect("defaults parse");
        assert_eq!(args.dt_ms, 16);
        assert_eq!(args.seed, 0);
        assert_eq!(args.upgrade_policy, UpgradePolicy::First);
        assert!(args.config.is_none());
    }

    #[test]
    fn flags_are_parsed() {
        let args = CliArgs::try_parse_from([
            "bastion",
            "--seed",
            "7",
            "--dt-ms",
            "50",
            "--max-ticks",
            "10",
            "--upgrade-policy",
            "random",
            "--config",
            "balance.toml",
        ])
        .expect("valid flags");
        assert_eq!(args.seed, 7);
        assert_eq!(args.dt_ms, 50);
        assert_eq!(args.max_ticks, 10);
        assert_eq!(args.upgrade_policy, UpgradePolicy::Random);
        assert_eq!(args.config, Some(PathBuf::from("balance.toml")));
    }

    #[test]
    fn zero_length_ticks_are_refused() {
        assert!(CliArgs::try_parse_from(["bastion", "--dt-ms", "0"]).is_err());
    }
}
