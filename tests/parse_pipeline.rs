//! End-to-end tests for the parse pipeline: raw shorthand in, priced draft
//! out, against a realistic catalog.

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use betcode::config::Catalog;
use betcode::parser::{parse, ParseContext};
use betcode::types::{
    BetType, CommissionSettings, DrawSlot, ExpansionRule, LineError, MatchMethod,
    NumberCombination, ParseError, Region, Station, StationRef,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn station(id: u32, name: &str, region: Region, aliases: &[&str], slots: &[(Weekday, u32)]) -> Station {
    Station {
        id,
        name: name.to_string(),
        region,
        aliases: aliases.iter().map(|s| s.to_string()).collect(),
        is_active: true,
        schedule: slots
            .iter()
            .map(|(weekday, order)| DrawSlot { weekday: *weekday, order: *order })
            .collect(),
    }
}

fn stations() -> Vec<Station> {
    vec![
        station(1, "TP. Hồ Chí Minh", Region::South, &["tp", "hcm"], &[(Weekday::Mon, 1)]),
        station(2, "Đồng Tháp", Region::South, &["dt"], &[(Weekday::Mon, 2)]),
        station(3, "Cà Mau", Region::South, &["cm"], &[(Weekday::Mon, 3)]),
        station(4, "Đà Nẵng", Region::Central, &["dn"], &[(Weekday::Mon, 1), (Weekday::Wed, 1)]),
        station(5, "Hà Nội", Region::North, &["hn"], &[(Weekday::Mon, 1)]),
    ]
}

fn bet_type(
    id: u32,
    name: &str,
    aliases: &[&str],
    regions: &[Region],
    method: MatchMethod,
    length: usize,
    payout: Decimal,
) -> BetType {
    BetType {
        id,
        name: name.to_string(),
        aliases: aliases.iter().map(|s| s.to_string()).collect(),
        regions: regions.to_vec(),
        match_method: method,
        number_length: length,
        payout_rate: payout,
        multiplier: Decimal::ONE,
        custom_payout_rate: None,
        custom_multiplier: None,
        combination_ids: Vec::new(),
        is_special: false,
        is_active: true,
    }
}

fn bet_types() -> Vec<BetType> {
    let mut da = bet_type(
        14,
        "Đá",
        &["da"],
        &[Region::Central, Region::South],
        MatchMethod::Exact,
        2,
        dec!(750),
    );
    da.combination_ids = vec![21];

    vec![
        bet_type(10, "Đầu đuôi", &["dd"], Region::ALL, MatchMethod::Partial, 2, dec!(75)),
        bet_type(11, "Bao lô", &["b", "bao"], Region::ALL, MatchMethod::Exact, 2, dec!(75)),
        bet_type(
            13,
            "Xỉu chủ đảo",
            &["xcd"],
            &[Region::Central, Region::South],
            MatchMethod::Permutation,
            3,
            dec!(650),
        ),
        da,
    ]
}

fn combinations() -> Vec<NumberCombination> {
    vec![
        NumberCombination {
            id: 20,
            name: "Đảo".to_string(),
            aliases: vec!["dao".to_string()],
            rule: ExpansionRule::Permutation,
            applicable_bet_types: Vec::new(),
            is_active: true,
        },
        NumberCombination {
            id: 21,
            name: "Xiên".to_string(),
            aliases: vec!["xien".to_string()],
            rule: ExpansionRule::Pairs { ordered: false },
            applicable_bet_types: vec![14],
            is_active: true,
        },
    ]
}

/// A Monday: tp, dt, cm draw in the south; dn and hn also draw.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()
}

fn ctx<'a>(
    stations: &'a [Station],
    bet_types: &'a [BetType],
    combinations: &'a [NumberCombination],
) -> ParseContext<'a> {
    ParseContext {
        stations,
        bet_types,
        combinations,
        commission: CommissionSettings::default(),
        draw_date: monday(),
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn single_line_bet_prices_per_contract() {
    let (s, b, c) = (stations(), bet_types(), combinations());
    let draft = parse("dn 23 45 dd10", &ctx(&s, &b, &c)).unwrap();

    assert_eq!(draft.lines.len(), 1);
    let line = &draft.lines[0];
    assert!(line.error.is_none());
    assert_eq!(line.numbers, vec!["23", "45"]);
    assert_eq!(line.amount, dec!(10000));
    assert_eq!(line.stake, dec!(16000)); // 10000 × 0.8 × 1 × 2
    assert_eq!(line.potential_prize, dec!(750000)); // 10000 × 75 × 1
    assert_eq!(draft.total_stake, dec!(16000));
    assert_eq!(
        draft.station,
        Some(StationRef::Single { name: "Đà Nẵng".to_string() })
    );
}

#[test]
fn multi_line_message_with_sticky_station() {
    let (s, b, c) = (stations(), bet_types(), combinations());
    let text = "tp\n23 45 dd10\n234 xcd2\n11 22 33 da5";
    let draft = parse(text, &ctx(&s, &b, &c)).unwrap();

    assert_eq!(draft.lines.len(), 4);
    assert!(draft.lines.iter().all(|l| l.error.is_none()));

    // Line 3: permutation bet, 6 distinct numbers.
    let xcd = &draft.lines[2];
    assert_eq!(xcd.numbers.len(), 6);
    assert!(xcd.is_permutation);
    assert_eq!(xcd.stake, dec!(9600)); // 2000 × 0.8 × 1 × 6
    assert_eq!(xcd.potential_prize, dec!(7800000)); // 2000 × 650 × 6

    // Line 4: đá links three numbers into three pairs.
    let da = &draft.lines[3];
    assert_eq!(da.numbers, vec!["11-22", "11-33", "22-33"]);
    assert_eq!(da.stake, dec!(12000)); // 5000 × 0.8 × 1 × 3

    let expected_total = draft
        .lines
        .iter()
        .map(|l| l.stake)
        .sum::<Decimal>();
    assert_eq!(draft.total_stake, expected_total);
}

#[test]
fn partial_failure_keeps_valid_lines_and_excludes_errors_from_totals() {
    let mut s = stations();
    s[3].is_active = false; // Đà Nẵng inactive
    let (b, c) = (bet_types(), combinations());
    let text = "tp 23 45 dd10\ndn 67 89 dd10\ncm 11 dd5";
    let draft = parse(text, &ctx(&s, &b, &c)).unwrap();

    assert_eq!(draft.lines.len(), 3);
    assert_eq!(
        draft.lines[1].error,
        Some(LineError::UnknownStation("dn".to_string()))
    );
    assert_eq!(draft.lines[1].stake, Decimal::ZERO);
    assert_eq!(draft.error_line_count(), 1);
    assert_eq!(draft.total_stake, dec!(16000) + dec!(4000));
}

#[test]
fn multi_station_list_prices_once() {
    let (s, b, c) = (stations(), bet_types(), combinations());
    let draft = parse("tp+dt 23 45 dd10", &ctx(&s, &b, &c)).unwrap();

    let line = &draft.lines[0];
    assert!(line.error.is_none());
    assert_eq!(
        line.station,
        Some(StationRef::Multi {
            names: vec!["TP. Hồ Chí Minh".to_string(), "Đồng Tháp".to_string()]
        })
    );
    // The stake formula runs once per line regardless of station count.
    assert_eq!(draft.total_stake, dec!(16000));
}

#[test]
fn region_wide_shorthand_expands_by_schedule() {
    let (s, b, c) = (stations(), bet_types(), combinations());
    let draft = parse("2dmn 34 56 b5", &ctx(&s, &b, &c)).unwrap();

    assert!(draft.auto_expanded);
    assert!(draft.special_case);
    match &draft.station {
        Some(StationRef::RegionWide { region, count, names }) => {
            assert_eq!(*region, Region::South);
            assert_eq!(*count, 2);
            assert_eq!(names, &vec!["TP. Hồ Chí Minh".to_string(), "Đồng Tháp".to_string()]);
        }
        other => panic!("expected region-wide station, got {other:?}"),
    }
}

#[test]
fn region_mismatch_flags_line() {
    let (s, b, c) = (stations(), bet_types(), combinations());
    // Đá is not offered in the north.
    let draft = parse("hn 23 45 da5", &ctx(&s, &b, &c)).unwrap();
    assert_eq!(
        draft.lines[0].error,
        Some(LineError::RegionMismatch {
            bet_type: "Đá".to_string(),
            region: Region::North
        })
    );
}

#[test]
fn wrong_number_length_flags_line() {
    let (s, b, c) = (stations(), bet_types(), combinations());
    let draft = parse("dn 234 dd10", &ctx(&s, &b, &c)).unwrap();
    assert_eq!(
        draft.lines[0].error,
        Some(LineError::InvalidNumberLength {
            number: "234".to_string(),
            expected: 2,
            got: 3
        })
    );
}

#[test]
fn commission_rate_out_of_range_fails_whole_parse() {
    let (s, b, c) = (stations(), bet_types(), combinations());
    let mut context = ctx(&s, &b, &c);
    context.commission.price_rate = dec!(1.5);
    let err = parse("dn 23 dd10", &context).unwrap_err();
    assert!(matches!(err, ParseError::InvalidCommissionRate { .. }));
}

#[test]
fn empty_configuration_fails_whole_parse() {
    let (s, b, c) = (stations(), bet_types(), combinations());
    assert!(matches!(
        parse("dn 23 dd10", &ctx(&[], &b, &c)),
        Err(ParseError::NoStations)
    ));
    assert!(matches!(
        parse("dn 23 dd10", &ctx(&s, &[], &c)),
        Err(ParseError::NoBetTypes)
    ));
}

#[test]
fn parsing_is_idempotent() {
    let (s, b, c) = (stations(), bet_types(), combinations());
    let context = ctx(&s, &b, &c);
    let text = "tp\n23 45 dd10\nbad 11 dd5\n234dao xcd2";
    let first = parse(text, &context).unwrap();
    let second = parse(text, &context).unwrap();
    assert_eq!(first, second);
}

#[test]
fn draft_serialises_to_json() {
    let (s, b, c) = (stations(), bet_types(), combinations());
    let draft = parse("dn 23 45 dd10", &ctx(&s, &b, &c)).unwrap();
    let json = serde_json::to_string(&draft).unwrap();
    assert!(json.contains("\"total_stake\""));
    assert!(json.contains("Đà Nẵng"));
}

#[test]
fn catalog_file_round_trip() {
    let toml_text = r#"
        [[stations]]
        id = 1
        name = "Đà Nẵng"
        region = "central"
        aliases = ["dn"]
        schedule = [{ weekday = "mon", order = 1 }]

        [[bet_types]]
        id = 10
        name = "Đầu đuôi"
        aliases = ["dd"]
        regions = ["north", "central", "south"]
        match_method = "partial"
        number_length = 2
        payout_rate = 75.0
    "#;

    let path = std::env::temp_dir().join("betcode_catalog_test.toml");
    std::fs::write(&path, toml_text).unwrap();
    let catalog = Catalog::load(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    let context = ParseContext {
        stations: &catalog.stations,
        bet_types: &catalog.bet_types,
        combinations: &catalog.combinations,
        commission: catalog.commission,
        draw_date: monday(),
    };
    let draft = parse("dn 23 45 dd10", &context).unwrap();
    assert_eq!(draft.total_stake, dec!(16000));
    assert_eq!(draft.total_potential_prize, dec!(750000));
}
