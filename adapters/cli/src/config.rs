//! Loads balance overrides from TOML.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use bastion_core::Tuning;

/// Reads the tuning file, falling back to the built-in balance when none is given.
pub(crate) fn load(path: Option<&Path>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read tuning file {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid tuning file {}", path.display()))
}

fn parse(contents: &str) -> Result<Tuning> {
    let tuning: Tuning = toml::from_str(contents).context("failed to parse tuning toml")?;
    tuning
        .validate()
        .context("tuning values cannot drive a campaign")?;
    Ok(tuning)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_uses_defaults() {
        assert_eq!(load(None).expect("defaults"), Tuning::default());
    }

    #[test]
    fn partial_files_only_override_named_values() {
        let tuning = parse(
            "[waves]\ntotal_waves = 5\n\n[economy]\nstarting_gold = 900\n",
        )
        .expect("valid overrides");
        assert_eq!(tuning.waves.total_waves, 5);
        assert_eq!(tuning.economy.starting_gold, 900);
        assert_eq!(tuning.enemies, Tuning::default().enemies);
    }

    #[test]
    fn invalid_values_are_reported() {
        let error = parse("[waves]\ntotal_waves = 0\n").expect_err("zero waves");
        assert!(format!("{error:#}").contains("waves.total_waves"));
    }

    #[test]
    fn malformed_toml_is_reported() {
        assert!(parse("[waves\ntotal_waves = 5").is_err());
    }

    #[test]
    fn unreadable_files_name_the_path() {
        let error = load(Some(Path::new("/nonexistent/bastion.toml"))).expect_err("missing file");
        assert!(format!("{error:#}").contains("/nonexistent/bastion.toml"));
    }
}
