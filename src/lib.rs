//! BETCODE — Vietnamese lottery bet-code parsing engine.
//!
//! Converts free-form betting shorthand (one bet per line) into structured,
//! priced, validated lines against caller-supplied station, bet-type,
//! combination and commission configuration. Pure and synchronous: every
//! parse call receives its own configuration snapshot and returns a fresh
//! [`types::DraftBetCode`]; the crate holds no state between invocations.

pub mod alias;
pub mod config;
pub mod expand;
pub mod parser;
pub mod permute;
pub mod price;
pub mod resolve;
pub mod token;
pub mod types;
