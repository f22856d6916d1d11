//! Parse pipeline: tokenize → resolve → expand → price → aggregate.
//!
//! The entry point is [`parse`]. Configuration arrives as an explicit
//! snapshot per call; a per-line failure annotates that line and excludes it
//! from the totals, while the rest of the batch proceeds — the caller gets a
//! draft back with as many valid lines as could be resolved. Only an
//! unusable input (empty text, no configuration, bad commission rates) fails
//! the whole parse.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::expand;
use crate::price;
use crate::resolve::{self, ResolvedStations};
use crate::token::{self, LineTokens};
use crate::types::{
    BetType, CommissionSettings, DraftBetCode, LineError, NumberCombination, ParseError,
    ParsedLine, Station, StationRef,
};

/// Configuration snapshot for one parse call. The caller supplies only what
/// the submitting user may access; per-user bet-type overrides are already
/// merged into the records.
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    pub stations: &'a [Station],
    pub bet_types: &'a [BetType],
    pub combinations: &'a [NumberCombination],
    pub commission: CommissionSettings,
    pub draw_date: NaiveDate,
}

/// Parse raw bet-code text into a priced draft.
pub fn parse(raw: &str, ctx: &ParseContext<'_>) -> Result<DraftBetCode, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }
    if !ctx.stations.iter().any(|s| s.is_active) {
        return Err(ParseError::NoStations);
    }
    if !ctx.bet_types.iter().any(|bt| bt.is_active) {
        return Err(ParseError::NoBetTypes);
    }
    ctx.commission.validate()?;

    let token_lines = token::tokenize(raw);
    let mut lines: Vec<ParsedLine> = Vec::with_capacity(token_lines.len());
    let mut current_station: Option<ResolvedStations> = None;
    let mut draft_station: Option<StationRef> = None;
    let mut auto_expanded = false;
    let mut special_case = false;

    for mut tokens in token_lines {
        let line = parse_line(&mut tokens, ctx, &mut current_station);

        if let Some(station) = &line.station {
            if draft_station.is_none() {
                draft_station = Some(station.clone());
            }
            if matches!(station, StationRef::RegionWide { .. }) {
                auto_expanded = true;
                special_case = true;
            }
        }
        if line.is_valid() {
            if let Some(name) = &line.bet_type {
                if ctx
                    .bet_types
                    .iter()
                    .any(|bt| bt.is_special && bt.name == *name)
                {
                    special_case = true;
                }
            }
        }
        lines.push(line);
    }

    let total = |f: fn(&ParsedLine) -> Decimal| -> Decimal {
        lines.iter().filter(|l| l.is_valid()).map(f).sum()
    };
    let total_stake = total(|l| l.stake);
    let total_export_stake = total(|l| l.export_stake);
    let total_return_stake = total(|l| l.return_stake);
    let total_potential_prize = total(|l| l.potential_prize);

    let draft = DraftBetCode {
        original_text: raw.to_string(),
        formatted_text: format_lines(&lines),
        station: draft_station,
        draw_date: ctx.draw_date,
        lines,
        total_stake,
        total_export_stake,
        total_return_stake,
        total_potential_prize,
        special_case,
        auto_expanded,
    };

    info!(
        lines = draft.lines.len(),
        errors = draft.error_line_count(),
        %total_stake,
        %total_potential_prize,
        "Bet code parsed"
    );

    Ok(draft)
}

/// Parse one token group, updating the sticky station context.
fn parse_line(
    tokens: &mut LineTokens,
    ctx: &ParseContext<'_>,
    current_station: &mut Option<ResolvedStations>,
) -> ParsedLine {
    let mut line = empty_line(&tokens.raw);

    // Resolve or reclassify the leading marker before anything else so a
    // failed line still advances the station context when the marker is
    // genuine.
    if let Some(marker) = tokens.station_marker.clone() {
        match resolve::resolve_station(&marker, ctx.stations, ctx.draw_date) {
            Ok(resolved) => {
                line.station = Some(resolved.reference.clone());
                *current_station = Some(resolved);
            }
            // A leading "234dao" tokenizes as a marker candidate; if it has
            // the shape of a coded digit group, put it back as a number.
            Err(_) if looks_like_coded_group(&marker, ctx.combinations) => {
                tokens.number_groups.insert(0, marker);
                tokens.station_marker = None;
            }
            Err(err) => {
                debug!(line = %tokens.raw, %err, "Station marker unresolvable");
                line.error = Some(err);
                return line;
            }
        }
    }

    if !tokens.trailing.is_empty() {
        line.error = Some(LineError::Malformed(tokens.trailing.join(" ")));
        return line;
    }

    if tokens.is_station_only() {
        // Context-setting line: no bet, no totals contribution.
        return line;
    }

    let Some(stations) = current_station.as_ref() else {
        line.error = Some(LineError::MissingStation);
        return line;
    };
    if line.station.is_none() {
        line.station = Some(stations.reference.clone());
    }

    let Some(alias) = tokens.bet_type_alias.as_deref() else {
        line.error = Some(LineError::MissingBetType);
        return line;
    };
    line.bet_type_alias = Some(alias.to_string());

    let bet_type = match resolve::resolve_bet_type(alias, ctx.bet_types, &stations.stations) {
        Ok(bt) => bt,
        Err(err) => {
            line.error = Some(err);
            return line;
        }
    };
    line.bet_type = Some(bet_type.name.clone());

    if let Some(token) = &tokens.invalid_amount {
        line.error = Some(LineError::InvalidAmount(token.clone()));
        return line;
    }
    let Some(amount) = tokens.amount else {
        line.error = Some(LineError::MissingAmount);
        return line;
    };
    line.amount = amount;

    let expanded = match expand::expand(&tokens.number_groups, ctx.combinations, bet_type) {
        Ok(e) => e,
        Err(err) => {
            line.error = Some(err);
            return line;
        }
    };
    line.numbers = expanded.numbers;
    line.is_permutation = expanded.is_permutation;

    let priced = price::price_line(
        amount,
        line.numbers.len(),
        expanded.prize_units,
        bet_type,
        &ctx.commission,
    );
    line.multiplier = priced.multiplier;
    line.payout_rate = priced.payout_rate;
    line.stake = priced.stake;
    line.export_stake = priced.export_stake;
    line.return_stake = priced.return_stake;
    line.potential_prize = priced.potential_prize;

    line
}

/// A fresh line with zeroed amounts.
fn empty_line(raw: &str) -> ParsedLine {
    ParsedLine {
        raw: raw.to_string(),
        bet_type: None,
        bet_type_alias: None,
        station: None,
        numbers: Vec::new(),
        amount: Decimal::ZERO,
        multiplier: Decimal::ZERO,
        payout_rate: Decimal::ZERO,
        stake: Decimal::ZERO,
        export_stake: Decimal::ZERO,
        return_stake: Decimal::ZERO,
        potential_prize: Decimal::ZERO,
        is_permutation: false,
        error: None,
    }
}

/// Whether a failed marker has the shape digits + active combination alias.
fn looks_like_coded_group(marker: &str, combinations: &[NumberCombination]) -> bool {
    let digit_end = marker.chars().take_while(|c| c.is_ascii_digit()).count();
    if digit_end == 0 {
        return false;
    }
    let suffix: String = marker.chars().skip(digit_end).collect();
    !suffix.is_empty()
        && combinations
            .iter()
            .filter(|c| c.is_active)
            .any(|c| crate::alias::matches(&suffix, &c.name, &c.aliases))
}

/// Normalised rendition of the accepted lines.
fn format_lines(lines: &[ParsedLine]) -> String {
    let unit = rust_decimal_macros::dec!(1000);
    lines
        .iter()
        .filter(|l| l.is_valid())
        .map(|l| {
            if l.numbers.is_empty() {
                match &l.station {
                    Some(station) => station.to_string(),
                    None => l.raw.clone(),
                }
            } else {
                let alias = l.bet_type_alias.as_deref().unwrap_or("");
                format!("{} {}{}", l.numbers.join(" "), alias, l.amount / unit)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
