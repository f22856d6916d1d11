//! Shared types for the bet-code engine.
//!
//! These types form the data model used across all modules: the validated
//! configuration records supplied by the caller per parse call, and the
//! ephemeral parse output handed back for persistence or display. They are
//! designed to be stable so that tokenizer, resolver, expander and pricing
//! modules can depend on them without circular references.

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// Lottery region (miền). Each region has its own stations, draw schedule
/// and prize structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    North,
    Central,
    South,
}

impl Region {
    /// All regions (useful for iteration).
    pub const ALL: &'static [Region] = &[Region::North, Region::Central, Region::South];
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::North => write!(f, "miền Bắc"),
            Region::Central => write!(f, "miền Trung"),
            Region::South => write!(f, "miền Nam"),
        }
    }
}

/// Attempt to parse a string into a Region (case-insensitive, accepts
/// English and folded Vietnamese forms).
impl std::str::FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::alias::fold(s).as_str() {
            "north" | "mienbac" | "mb" => Ok(Region::North),
            "central" | "mientrung" | "mt" => Ok(Region::Central),
            "south" | "miennam" | "mn" => Ok(Region::South),
            _ => Err(anyhow::anyhow!("Unknown region: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Station
// ---------------------------------------------------------------------------

/// A weekday slot in a station's draw schedule. `order` ranks stations
/// drawing on the same day, used when a region-wide shorthand asks for the
/// first N stations of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawSlot {
    pub weekday: Weekday,
    pub order: u32,
}

/// A lottery draw station (đài). Read-only configuration: the parser never
/// mutates stations.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: u32,
    pub name: String,
    pub region: Region,
    pub aliases: Vec<String>,
    pub is_active: bool,
    pub schedule: Vec<DrawSlot>,
}

impl Station {
    /// Draw order for the given weekday, if the station draws that day.
    pub fn draw_order_on(&self, weekday: Weekday) -> Option<u32> {
        self.schedule
            .iter()
            .find(|slot| slot.weekday == weekday)
            .map(|slot| slot.order)
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.region)
    }
}

// ---------------------------------------------------------------------------
// Bet type
// ---------------------------------------------------------------------------

/// How a bet type matches drawn numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchMethod {
    /// Exact number match against a prize tier.
    Exact,
    /// Partial (head/tail) match.
    Partial,
    /// All digit permutations of the chosen number are covered.
    Permutation,
}

/// A bet type (kiểu đánh), with any per-user overrides already merged in by
/// the configuration-loading collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct BetType {
    pub id: u32,
    pub name: String,
    pub aliases: Vec<String>,
    /// Regions this bet type is offered in.
    pub regions: Vec<Region>,
    pub match_method: MatchMethod,
    /// Digit length the bet type expects (2 for bao lô, 3 for xỉu chủ, ...).
    pub number_length: usize,
    /// Payout rate per unit staked (e.g. 75 for đầu đuôi).
    pub payout_rate: Decimal,
    pub multiplier: Decimal,
    /// Per-user payout override, if any.
    pub custom_payout_rate: Option<Decimal>,
    /// Per-user multiplier override, if any.
    pub custom_multiplier: Option<Decimal>,
    /// Combination definitions this bet type applies implicitly
    /// (e.g. đá pairs its numbers).
    pub combination_ids: Vec<u32>,
    /// Irregular shorthand requiring special handling downstream.
    pub is_special: bool,
    pub is_active: bool,
}

impl BetType {
    /// Whether every chosen number implies its full permutation set.
    pub fn is_permutation(&self) -> bool {
        self.match_method == MatchMethod::Permutation
    }

    /// Payout rate after applying the per-user override.
    pub fn effective_payout_rate(&self) -> Decimal {
        self.custom_payout_rate.unwrap_or(self.payout_rate)
    }

    /// Multiplier after applying the per-user override.
    pub fn effective_multiplier(&self) -> Decimal {
        self.custom_multiplier.unwrap_or(self.multiplier)
    }

    /// Whether this bet type is offered in the given region.
    pub fn offered_in(&self, region: Region) -> bool {
        self.regions.contains(&region)
    }
}

// ---------------------------------------------------------------------------
// Number combination
// ---------------------------------------------------------------------------

/// How a combination expands its numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpansionRule {
    /// Expand a number to all its distinct digit permutations (đảo).
    Permutation,
    /// Link the line's numbers into pairs (đá/xiên); `ordered` controls
    /// whether (a,b) and (b,a) are distinct wagers.
    Pairs { ordered: bool },
}

/// A shorthand number-combination definition (đảo, xiên, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct NumberCombination {
    pub id: u32,
    pub name: String,
    pub aliases: Vec<String>,
    pub rule: ExpansionRule,
    /// Bet-type ids this combination may be used with; empty means any.
    pub applicable_bet_types: Vec<u32>,
    pub is_active: bool,
}

impl NumberCombination {
    /// Whether this combination may be used with the given bet type.
    pub fn applies_to(&self, bet_type_id: u32) -> bool {
        self.applicable_bet_types.is_empty() || self.applicable_bet_types.contains(&bet_type_id)
    }
}

// ---------------------------------------------------------------------------
// Commission settings
// ---------------------------------------------------------------------------

/// Per-user commission rates. All three are decimals in [0,1]; out-of-range
/// values are rejected before any line is priced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommissionSettings {
    /// Rate applied to the player-facing stake.
    pub price_rate: Decimal,
    /// Rate applied when exporting lines upstream.
    pub export_price_rate: Decimal,
    /// Rate applied to returned (refunded) lines.
    pub return_price_rate: Decimal,
}

impl Default for CommissionSettings {
    fn default() -> Self {
        Self {
            price_rate: dec!(0.8),
            export_price_rate: dec!(0.74),
            return_price_rate: dec!(0.95),
        }
    }
}

impl CommissionSettings {
    /// Check all rates fall in [0,1].
    pub fn validate(&self) -> Result<(), ParseError> {
        for (name, value) in [
            ("price_rate", self.price_rate),
            ("export_price_rate", self.export_price_rate),
            ("return_price_rate", self.return_price_rate),
        ] {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(ParseError::InvalidCommissionRate { name, value });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Parse output
// ---------------------------------------------------------------------------

/// Resolved station descriptor for a line or a whole draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StationRef {
    /// One named station.
    Single { name: String },
    /// An explicit list of stations (e.g. "tp+dt").
    Multi { names: Vec<String> },
    /// Region-wide shorthand: the first `count` stations of `region` drawing
    /// on the draw date, auto-expanded to `names`.
    RegionWide {
        region: Region,
        count: u32,
        names: Vec<String>,
    },
}

impl StationRef {
    /// Station names covered by this reference.
    pub fn names(&self) -> Vec<&str> {
        match self {
            StationRef::Single { name } => vec![name.as_str()],
            StationRef::Multi { names } | StationRef::RegionWide { names, .. } => {
                names.iter().map(String::as_str).collect()
            }
        }
    }
}

impl fmt::Display for StationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationRef::Single { name } => write!(f, "{name}"),
            StationRef::Multi { names } => write!(f, "{}", names.join("+")),
            StationRef::RegionWide { region, count, names } => {
                write!(f, "{count} đài {region} ({})", names.join("+"))
            }
        }
    }
}

/// One parsed line of a bet code. A line with a non-null `error` contributes
/// zero to the draft totals but is retained so the caller can surface it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLine {
    /// Original line text, untouched.
    pub raw: String,
    /// Resolved bet-type name, if resolution got that far.
    pub bet_type: Option<String>,
    /// The alias the user actually wrote.
    pub bet_type_alias: Option<String>,
    pub station: Option<StationRef>,
    /// Expanded, deduplicated numbers staked by this line.
    pub numbers: Vec<String>,
    /// Base amount in đồng (stake tokens are entered in thousands).
    pub amount: Decimal,
    pub multiplier: Decimal,
    pub payout_rate: Decimal,
    /// amount × price_rate × multiplier × number count, rounded once.
    pub stake: Decimal,
    pub export_stake: Decimal,
    pub return_stake: Decimal,
    /// Payout for one winning number (covering its permutations for
    /// permutation bet types).
    pub potential_prize: Decimal,
    pub is_permutation: bool,
    pub error: Option<LineError>,
}

impl ParsedLine {
    /// A line that resolved and priced cleanly.
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// The assembled draft returned to the caller for review or persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftBetCode {
    pub original_text: String,
    /// Normalised rendition of the accepted lines.
    pub formatted_text: String,
    /// The first resolved station descriptor (drafts usually open with a
    /// station line that the following bets inherit).
    pub station: Option<StationRef>,
    pub draw_date: NaiveDate,
    /// One entry per non-blank input line, in input order.
    pub lines: Vec<ParsedLine>,
    pub total_stake: Decimal,
    pub total_export_stake: Decimal,
    pub total_return_stake: Decimal,
    pub total_potential_prize: Decimal,
    /// Set when any line used irregular shorthand (region-wide expansion or
    /// a special-calculation bet type). UI metadata, not a pricing input.
    pub special_case: bool,
    /// Set when a region-wide shorthand auto-expanded into station names.
    pub auto_expanded: bool,
}

impl DraftBetCode {
    /// Number of lines that resolved and priced cleanly.
    pub fn valid_line_count(&self) -> usize {
        self.lines.iter().filter(|l| l.is_valid()).count()
    }

    /// Number of lines carrying an error annotation.
    pub fn error_line_count(&self) -> usize {
        self.lines.len() - self.valid_line_count()
    }
}

impl fmt::Display for DraftBetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} lines ({} errors) | stake {} | prize {}",
            self.draw_date,
            self.lines.len(),
            self.error_line_count(),
            self.total_stake,
            self.total_potential_prize,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Top-level parse failure: the whole input is unusable. Anything
/// recoverable per line is a [`LineError`] instead.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Empty bet-code text")]
    EmptyInput,

    #[error("No accessible stations supplied")]
    NoStations,

    #[error("No active bet types supplied")]
    NoBetTypes,

    #[error("Commission rate out of range: {name} = {value}")]
    InvalidCommissionRate { name: &'static str, value: Decimal },
}

/// Per-line error. The line is retained with this annotation and excluded
/// from the draft totals; the rest of the batch proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum LineError {
    #[error("Unknown station: {0}")]
    UnknownStation(String),

    #[error("No station in effect for this line")]
    MissingStation,

    #[error("Unknown bet type: {0}")]
    UnknownBetType(String),

    #[error("No bet type on this line")]
    MissingBetType,

    #[error("Bet type {bet_type} is not offered in {region}")]
    RegionMismatch { bet_type: String, region: Region },

    #[error("Number {number} has {got} digits, expected {expected}")]
    InvalidNumberLength {
        number: String,
        expected: usize,
        got: usize,
    },

    #[error("Expansion of {0} exceeds the permutation limit")]
    TooManyPermutations(String),

    #[error("No numbers to bet on")]
    NoNumbers,

    #[error("Missing stake amount")]
    MissingAmount,

    #[error("Invalid stake amount: {0}")]
    InvalidAmount(String),

    #[error("Unparseable segment: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
