//! Catalog loading from TOML.
//!
//! Reads a catalog file (stations, bet types, combinations, commission
//! rates) and deserializes into raw config structs, then validates and
//! converts them into the typed core records. All validation happens here,
//! at the boundary — the parse pipeline assumes well-formed configuration.

use anyhow::{bail, Context, Result};
use chrono::Weekday;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::str::FromStr;

use crate::types::{
    BetType, CommissionSettings, DrawSlot, ExpansionRule, MatchMethod, NumberCombination, Region,
    Station,
};

/// Validated catalog ready to hand to the parser.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub stations: Vec<Station>,
    pub bet_types: Vec<BetType>,
    pub combinations: Vec<NumberCombination>,
    pub commission: CommissionSettings,
}

impl Catalog {
    /// Load and validate a catalog from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {path}"))?;
        let raw: CatalogConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse catalog file: {path}"))?;
        raw.validate()
    }
}

// ---------------------------------------------------------------------------
// Raw config structs (serde only — validation converts to core types)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CatalogConfig {
    #[serde(default)]
    stations: Vec<StationConfig>,
    #[serde(default)]
    bet_types: Vec<BetTypeConfig>,
    #[serde(default)]
    combinations: Vec<CombinationConfig>,
    commission: Option<CommissionConfig>,
}

#[derive(Debug, Deserialize)]
struct StationConfig {
    id: u32,
    name: String,
    region: String,
    #[serde(default)]
    aliases: Vec<String>,
    #[serde(default = "default_true")]
    is_active: bool,
    #[serde(default)]
    schedule: Vec<ScheduleConfig>,
}

#[derive(Debug, Deserialize)]
struct ScheduleConfig {
    weekday: String,
    #[serde(default = "default_order")]
    order: u32,
}

#[derive(Debug, Deserialize)]
struct BetTypeConfig {
    id: u32,
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    regions: Vec<String>,
    match_method: String,
    number_length: usize,
    payout_rate: Decimal,
    #[serde(default = "default_multiplier")]
    multiplier: Decimal,
    custom_payout_rate: Option<Decimal>,
    custom_multiplier: Option<Decimal>,
    #[serde(default)]
    combinations: Vec<u32>,
    #[serde(default)]
    is_special: bool,
    #[serde(default = "default_true")]
    is_active: bool,
}

#[derive(Debug, Deserialize)]
struct CombinationConfig {
    id: u32,
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
    rule: String,
    #[serde(default)]
    applicable_bet_types: Vec<u32>,
    #[serde(default = "default_true")]
    is_active: bool,
}

#[derive(Debug, Deserialize)]
struct CommissionConfig {
    price_rate: Option<Decimal>,
    export_price_rate: Option<Decimal>,
    return_price_rate: Option<Decimal>,
}

fn default_true() -> bool {
    true
}

fn default_order() -> u32 {
    1
}

fn default_multiplier() -> Decimal {
    Decimal::ONE
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl CatalogConfig {
    fn validate(self) -> Result<Catalog> {
        if self.stations.is_empty() {
            bail!("Catalog has no stations");
        }
        if self.bet_types.is_empty() {
            bail!("Catalog has no bet types");
        }

        let stations = self
            .stations
            .into_iter()
            .map(StationConfig::validate)
            .collect::<Result<Vec<_>>>()?;
        let bet_types = self
            .bet_types
            .into_iter()
            .map(BetTypeConfig::validate)
            .collect::<Result<Vec<_>>>()?;
        let combinations = self
            .combinations
            .into_iter()
            .map(CombinationConfig::validate)
            .collect::<Result<Vec<_>>>()?;

        let defaults = CommissionSettings::default();
        let commission = match self.commission {
            Some(c) => CommissionSettings {
                price_rate: c.price_rate.unwrap_or(defaults.price_rate),
                export_price_rate: c.export_price_rate.unwrap_or(defaults.export_price_rate),
                return_price_rate: c.return_price_rate.unwrap_or(defaults.return_price_rate),
            },
            None => defaults,
        };
        commission
            .validate()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .context("Invalid commission settings in catalog")?;

        Ok(Catalog { stations, bet_types, combinations, commission })
    }
}

impl StationConfig {
    fn validate(self) -> Result<Station> {
        let region = Region::from_str(&self.region)
            .with_context(|| format!("Station {}: bad region", self.name))?;
        let schedule = self
            .schedule
            .into_iter()
            .map(|slot| {
                let weekday = Weekday::from_str(&slot.weekday).map_err(|_| {
                    anyhow::anyhow!("Station {}: bad weekday {:?}", self.name, slot.weekday)
                })?;
                Ok(DrawSlot { weekday, order: slot.order })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Station {
            id: self.id,
            name: self.name,
            region,
            aliases: self.aliases,
            is_active: self.is_active,
            schedule,
        })
    }
}

impl BetTypeConfig {
    fn validate(self) -> Result<BetType> {
        if self.number_length == 0 {
            bail!("Bet type {}: number_length must be at least 1", self.name);
        }
        if self.payout_rate <= Decimal::ZERO {
            bail!("Bet type {}: payout_rate must be positive", self.name);
        }
        let match_method = match self.match_method.as_str() {
            "exact" => MatchMethod::Exact,
            "partial" => MatchMethod::Partial,
            "permutation" => MatchMethod::Permutation,
            other => bail!("Bet type {}: unknown match method {other:?}", self.name),
        };
        let regions = self
            .regions
            .iter()
            .map(|r| {
                Region::from_str(r).with_context(|| format!("Bet type {}: bad region", self.name))
            })
            .collect::<Result<Vec<_>>>()?;
        if regions.is_empty() {
            bail!("Bet type {}: no regions", self.name);
        }

        Ok(BetType {
            id: self.id,
            name: self.name,
            aliases: self.aliases,
            regions,
            match_method,
            number_length: self.number_length,
            payout_rate: self.payout_rate,
            multiplier: self.multiplier,
            custom_payout_rate: self.custom_payout_rate,
            custom_multiplier: self.custom_multiplier,
            combination_ids: self.combinations,
            is_special: self.is_special,
            is_active: self.is_active,
        })
    }
}

impl CombinationConfig {
    fn validate(self) -> Result<NumberCombination> {
        let rule = match self.rule.as_str() {
            "permutation" => ExpansionRule::Permutation,
            "pairs" => ExpansionRule::Pairs { ordered: false },
            "ordered_pairs" => ExpansionRule::Pairs { ordered: true },
            other => bail!("Combination {}: unknown rule {other:?}", self.name),
        };
        Ok(NumberCombination {
            id: self.id,
            name: self.name,
            aliases: self.aliases,
            rule,
            applicable_bet_types: self.applicable_bet_types,
            is_active: self.is_active,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
