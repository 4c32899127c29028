use crate::config::EngineConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads engine configuration by layering built-in defaults, the TOML file
    /// at `path` (if present), and `BETEDGE_` environment variables.
    ///
    /// Nested keys use a double underscore: `BETEDGE_GATE__MIN_EV=0.03`.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider cannot be parsed into `EngineConfig`.
    pub fn load(path: impl AsRef<Path>) -> Result<EngineConfig> {
        let path = path.as_ref();
        Self::figment(path, None)
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    /// Loads configuration with a profile overlay (`Betedge.{profile}.toml`
    /// next to the base file). Environment variables still win.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider cannot be parsed into `EngineConfig`.
    pub fn load_with_profile(path: impl AsRef<Path>, profile: &str) -> Result<EngineConfig> {
        let path = path.as_ref();
        let overlay = path.with_file_name(format!("Betedge.{profile}.toml"));

        Self::figment(path, Some(&overlay))
            .extract()
            .with_context(|| {
                format!(
                    "Failed to load config from {} with profile {profile}",
                    path.display()
                )
            })
    }

    // Provider order: defaults, base file, profile overlay, env.
    fn figment(path: &Path, overlay: Option<&Path>) -> Figment {
        let mut figment =
            Figment::from(Serialized::defaults(EngineConfig::default())).merge(Toml::file(path));
        if let Some(overlay) = overlay {
            figment = figment.merge(Toml::file(overlay));
        }
        figment.merge(Env::prefixed("BETEDGE_").split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn missing_file_yields_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = ConfigLoader::load("Betedge.toml").expect("defaults");
            assert_eq!(config.gate.min_ev, dec!(0.02));
            assert_eq!(config.tiers.len(), 3);
            Ok(())
        });
    }

    #[test]
    fn toml_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "Betedge.toml",
                r#"
                [gate]
                min_ev = "0.05"
                odds_max_snapshot_age_hours = "2"

                [bankroll]
                total_bankroll = "5000"
                "#,
            )?;

            let config = ConfigLoader::load("Betedge.toml").expect("toml");
            assert_eq!(config.gate.min_ev, dec!(0.05));
            assert_eq!(config.gate.odds_max_snapshot_age_hours, dec!(2));
            assert_eq!(config.gate.min_confidence, dec!(0.60));
            assert_eq!(config.bankroll.total_bankroll, dec!(5000));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("Betedge.toml", "[risk]\nskip_min_confidence = \"0.50\"\n")?;
            jail.set_env("BETEDGE_RISK__SKIP_MIN_CONFIDENCE", "0.58");

            let config = ConfigLoader::load("Betedge.toml").expect("env");
            assert_eq!(config.risk.skip_min_confidence, dec!(0.58));
            Ok(())
        });
    }

    #[test]
    fn profile_overlay_applies() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("Betedge.toml", "[staking]\nflat_stake_pct = \"0.02\"\n")?;
            jail.create_file(
                "Betedge.aggressive.toml",
                "[staking]\nflat_stake_pct = \"0.03\"\n",
            )?;

            let config = ConfigLoader::load_with_profile("Betedge.toml", "aggressive")
                .expect("profile");
            assert_eq!(config.staking.flat_stake_pct, dec!(0.03));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_profile_overlay() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("Betedge.toml", "[gate]\nmin_ev = \"0.02\"\n")?;
            jail.create_file("Betedge.strict.toml", "[gate]\nmin_ev = \"0.04\"\n")?;
            jail.set_env("BETEDGE_GATE__MIN_EV", "0.05");

            let config =
                ConfigLoader::load_with_profile("Betedge.toml", "strict").expect("profile");
            assert_eq!(config.gate.min_ev, dec!(0.05));
            Ok(())
        });
    }

    #[test]
    fn missing_profile_file_falls_back_to_base() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("Betedge.toml", "[gate]\nmin_ev = \"0.04\"\n")?;

            let config =
                ConfigLoader::load_with_profile("Betedge.toml", "absent").expect("base");
            assert_eq!(config.gate.min_ev, dec!(0.04));
            Ok(())
        });
    }
}
