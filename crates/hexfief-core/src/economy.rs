use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EconomyError {
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid economy: {0}")]
    Invalid(&'static str),
}

pub enum EconomySource<'a> {
    Embedded,
    Path(String),
    Bytes(&'a [u8]),
}

/// Economy tuning injected into the arbiter at construction. Prices, level
/// caps and income/upkeep coefficients are data, not law; tests vary them.
#[derive(Clone, Debug, Deserialize)]
pub struct EconomyConfig {
    #[serde(default = "default_unit_price")]
    pub unit_price: i32,
    #[serde(default = "default_tower_price")]
    pub tower_price: i32,
    #[serde(default = "default_unit_max_level")]
    pub unit_max_level: u8,
    /// Starting treasury per hex when a kingdom is founded at generation.
    #[serde(default = "default_hex_seed_money")]
    pub hex_seed_money: i32,
    #[serde(default = "default_income_per_hex")]
    pub income_per_hex: i32,
    #[serde(default = "default_upkeep_base")]
    pub upkeep_base: i32,
    #[serde(default = "default_upkeep_growth")]
    pub upkeep_growth: i32,
    /// Protection level a tower grants to its own and adjacent hexes.
    #[serde(default = "default_tower_protection")]
    pub tower_protection: u8,
    /// Protection level a capital grants to its own and adjacent hexes.
    #[serde(default = "default_capital_protection")]
    pub capital_protection: u8,
}

fn default_unit_price() -> i32 {
    10
}
fn default_tower_price() -> i32 {
    15
}
fn default_unit_max_level() -> u8 {
    4
}
fn default_hex_seed_money() -> i32 {
    5
}
fn default_income_per_hex() -> i32 {
    1
}
fn default_upkeep_base() -> i32 {
    2
}
fn default_upkeep_growth() -> i32 {
    3
}
fn default_tower_protection() -> u8 {
    2
}
fn default_capital_protection() -> u8 {
    1
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            unit_price: default_unit_price(),
            tower_price: default_tower_price(),
            unit_max_level: default_unit_max_level(),
            hex_seed_money: default_hex_seed_money(),
            income_per_hex: default_income_per_hex(),
            upkeep_base: default_upkeep_base(),
            upkeep_growth: default_upkeep_growth(),
            tower_protection: default_tower_protection(),
            capital_protection: default_capital_protection(),
        }
    }
}

impl EconomyConfig {
    /// Per-turn upkeep of a single unit: `upkeep_base * upkeep_growth^(level-1)`.
    pub fn unit_upkeep(&self, level: u8) -> i32 {
        self.upkeep_base * self.upkeep_growth.pow(u32::from(level.saturating_sub(1)))
    }

    pub fn seed_money(&self, size: usize) -> i32 {
        self.hex_seed_money * size as i32
    }

    fn validate(&self) -> Result<(), EconomyError> {
        if self.unit_price <= 0 || self.tower_price <= 0 {
            return Err(EconomyError::Invalid("prices must be positive"));
        }
        if self.unit_max_level == 0 {
            return Err(EconomyError::Invalid("unit_max_level must be at least 1"));
        }
        if self.upkeep_growth < 1 {
            return Err(EconomyError::Invalid("upkeep_growth must be at least 1"));
        }
        Ok(())
    }
}

pub fn load_economy(source: EconomySource<'_>) -> Result<EconomyConfig, EconomyError> {
    let config: EconomyConfig = match source {
        EconomySource::Embedded => serde_yaml::from_str(include_str!("../data/economy.yaml"))?,
        EconomySource::Path(path) => serde_yaml::from_str(&std::fs::read_to_string(path)?)?,
        EconomySource::Bytes(bytes) => serde_yaml::from_str(std::str::from_utf8(bytes)?)?,
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse_and_match_fallbacks() {
        let loaded = load_economy(EconomySource::Embedded).expect("embedded economy");
        let fallback = EconomyConfig::default();
        assert_eq!(loaded.unit_price, fallback.unit_price);
        assert_eq!(loaded.tower_price, fallback.tower_price);
        assert_eq!(loaded.unit_max_level, fallback.unit_max_level);
        assert_eq!(loaded.hex_seed_money, fallback.hex_seed_money);
    }

    #[test]
    fn partial_yaml_overrides_merge_with_defaults() {
        let yaml = b"unit_price: 12\nupkeep_growth: 2\n";
        let config = load_economy(EconomySource::Bytes(yaml)).expect("partial economy");
        assert_eq!(config.unit_price, 12);
        assert_eq!(config.upkeep_growth, 2);
        assert_eq!(config.tower_price, 15);
    }

    #[test]
    fn upkeep_grows_geometrically_with_level() {
        let config = EconomyConfig::default();
        assert_eq!(config.unit_upkeep(1), 2);
        assert_eq!(config.unit_upkeep(2), 6);
        assert_eq!(config.unit_upkeep(3), 18);
        assert_eq!(config.unit_upkeep(4), 54);
    }

    #[test]
    fn zero_max_level_is_rejected() {
        let yaml = b"unit_max_level: 0\n";
        assert!(matches!(
            load_economy(EconomySource::Bytes(yaml)),
            Err(EconomyError::Invalid(_))
        ));
    }
}
