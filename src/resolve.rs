//! Station and bet-type resolution.
//!
//! Maps marker/alias text to canonical records from the caller-supplied
//! configuration. Access control is enforced by construction: the resolver
//! only ever sees the stations and bet types the caller allows, and treats
//! inactive entries as unresolvable.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::alias;
use crate::types::{BetType, LineError, Region, Station, StationRef};

/// Region shorthand accepted in station markers ("2dmn", "mt", ...).
const REGION_MARKERS: &[(&str, Region)] = &[
    ("mb", Region::North),
    ("dmb", Region::North),
    ("mienbac", Region::North),
    ("db", Region::North),
    ("mt", Region::Central),
    ("dmt", Region::Central),
    ("mientrung", Region::Central),
    ("mn", Region::South),
    ("dmn", Region::South),
    ("miennam", Region::South),
];

/// Stations resolved for one marker: the descriptor for display plus the
/// concrete records the rest of the pipeline validates against.
#[derive(Debug, Clone)]
pub struct ResolvedStations {
    pub reference: StationRef,
    pub stations: Vec<Station>,
}

impl ResolvedStations {
    /// Whether this resolution came from region-wide shorthand.
    pub fn is_region_wide(&self) -> bool {
        matches!(self.reference, StationRef::RegionWide { .. })
    }
}

/// Resolve a station marker against the accessible stations.
///
/// Accepts, in order of precedence: region-count shorthand ("2dmn"), a bare
/// region marker (one station of that region drawing on the date), a single
/// station alias, and a '+'-joined explicit list ("tp+dt"). Anything else is
/// [`LineError::UnknownStation`] for that line only.
pub fn resolve_station(
    marker: &str,
    stations: &[Station],
    draw_date: NaiveDate,
) -> Result<ResolvedStations, LineError> {
    let folded = alias::fold(marker);
    if folded.is_empty() {
        return Err(LineError::UnknownStation(marker.to_string()));
    }

    // Region-count shorthand: leading digits then a region marker.
    let digit_end = folded.chars().take_while(|c| c.is_ascii_digit()).count();
    if digit_end > 0 {
        let (count_str, region_str) = folded.split_at(digit_end);
        if let Some(region) = region_marker(region_str) {
            let count: u32 = count_str
                .parse()
                .map_err(|_| LineError::UnknownStation(marker.to_string()))?;
            return resolve_region_wide(marker, region, count, stations, draw_date);
        }
        // Digits followed by something that isn't a region — not a station.
        return Err(LineError::UnknownStation(marker.to_string()));
    }

    // Bare region marker: the first station of that region drawing that day.
    if let Some(region) = region_marker(&folded) {
        return resolve_region_wide(marker, region, 1, stations, draw_date);
    }

    // Explicit multi-station list.
    if folded.contains('+') {
        let mut names = Vec::new();
        let mut resolved = Vec::new();
        for part in folded.split('+').filter(|p| !p.is_empty()) {
            let station = find_station(part, stations)
                .ok_or_else(|| LineError::UnknownStation(marker.to_string()))?;
            names.push(station.name.clone());
            resolved.push(station.clone());
        }
        if resolved.is_empty() {
            return Err(LineError::UnknownStation(marker.to_string()));
        }
        return Ok(ResolvedStations {
            reference: StationRef::Multi { names },
            stations: resolved,
        });
    }

    // Single station alias.
    let station =
        find_station(&folded, stations).ok_or_else(|| LineError::UnknownStation(marker.to_string()))?;
    debug!(marker, station = %station.name, "Station resolved");
    Ok(ResolvedStations {
        reference: StationRef::Single { name: station.name.clone() },
        stations: vec![station.clone()],
    })
}

/// Expand a region-wide marker to the first `count` stations of the region
/// drawing on the draw date, in schedule order.
fn resolve_region_wide(
    marker: &str,
    region: Region,
    count: u32,
    stations: &[Station],
    draw_date: NaiveDate,
) -> Result<ResolvedStations, LineError> {
    if count == 0 {
        return Err(LineError::UnknownStation(marker.to_string()));
    }

    let weekday = draw_date.weekday();
    let mut drawing: Vec<(u32, &Station)> = stations
        .iter()
        .filter(|s| s.is_active && s.region == region)
        .filter_map(|s| s.draw_order_on(weekday).map(|order| (order, s)))
        .collect();
    drawing.sort_by_key(|(order, s)| (*order, s.id));

    if (drawing.len() as u32) < count {
        debug!(
            marker,
            %region,
            wanted = count,
            available = drawing.len(),
            "Not enough stations drawing for region shorthand"
        );
        return Err(LineError::UnknownStation(marker.to_string()));
    }

    let picked: Vec<Station> = drawing
        .into_iter()
        .take(count as usize)
        .map(|(_, s)| s.clone())
        .collect();
    let names = picked.iter().map(|s| s.name.clone()).collect();

    Ok(ResolvedStations {
        reference: StationRef::RegionWide { region, count, names },
        stations: picked,
    })
}

/// Find an active station by folded alias.
fn find_station<'a>(folded_marker: &str, stations: &'a [Station]) -> Option<&'a Station> {
    stations
        .iter()
        .filter(|s| s.is_active)
        .find(|s| alias::matches(folded_marker, &s.name, &s.aliases))
}

fn region_marker(folded: &str) -> Option<Region> {
    REGION_MARKERS
        .iter()
        .find(|(m, _)| *m == folded)
        .map(|(_, region)| *region)
}

/// Resolve a bet-type alias among the active bet types, then check the bet
/// type is offered in every resolved station's region.
pub fn resolve_bet_type<'a>(
    alias_text: &str,
    bet_types: &'a [BetType],
    stations: &[Station],
) -> Result<&'a BetType, LineError> {
    let bet_type = bet_types
        .iter()
        .filter(|bt| bt.is_active)
        .find(|bt| alias::matches(alias_text, &bt.name, &bt.aliases))
        .ok_or_else(|| LineError::UnknownBetType(alias_text.to_string()))?;

    for station in stations {
        if !bet_type.offered_in(station.region) {
            return Err(LineError::RegionMismatch {
                bet_type: bet_type.name.clone(),
                region: station.region,
            });
        }
    }

    debug!(alias = alias_text, bet_type = %bet_type.name, "Bet type resolved");
    Ok(bet_type)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
