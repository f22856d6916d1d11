//! Lexical normalizer.
//!
//! Splits raw multi-line betting shorthand into per-line token groups:
//! optional leading station marker, digit groups (possibly combination-coded
//! like "234dao"), trailing bet-type alias, and stake amount. Blank lines
//! are skipped. Tokenization is structural only — whether a marker actually
//! names a station or a digit group a real combination is the resolver's and
//! expander's business.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Token group for one physical line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineTokens {
    /// Original line text, trimmed.
    pub raw: String,
    /// 1-based physical line number in the input.
    pub line_no: usize,
    /// Leading segment containing letters — a station marker candidate.
    /// May turn out to be a combination-coded digit group instead; the
    /// parser reclassifies it if station resolution fails.
    pub station_marker: Option<String>,
    /// Digit groups, in order. Combination suffixes stay attached.
    pub number_groups: Vec<String>,
    /// Trailing bet-type alias, if present.
    pub bet_type_alias: Option<String>,
    /// Stake amount in đồng. Stake tokens are entered in thousands
    /// ("dd10" → 10 000₫), scaled here.
    pub amount: Option<Decimal>,
    /// A stake-shaped token that failed to parse as a positive amount
    /// ("dd0", "dd 0"). Kept so the parser can report the offending token.
    pub invalid_amount: Option<String>,
    /// Segments that fit nowhere — non-empty means the line is malformed.
    pub trailing: Vec<String>,
}

impl LineTokens {
    /// A line carrying only a station marker sets the station context for
    /// the lines below it without placing a bet itself.
    pub fn is_station_only(&self) -> bool {
        self.station_marker.is_some()
            && self.number_groups.is_empty()
            && self.bet_type_alias.is_none()
            && self.amount.is_none()
    }
}

/// Stake tokens are written in thousands of đồng.
const AMOUNT_UNIT: Decimal = dec!(1000);

/// Split raw text into one token group per non-blank line.
pub fn tokenize(raw: &str) -> Vec<LineTokens> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| tokenize_line(line.trim(), idx + 1))
        .collect()
}

/// Tokenize a single trimmed, non-blank line.
fn tokenize_line(line: &str, line_no: usize) -> LineTokens {
    let mut tokens = LineTokens {
        raw: line.to_string(),
        line_no,
        station_marker: None,
        number_groups: Vec::new(),
        bet_type_alias: None,
        amount: None,
        invalid_amount: None,
        trailing: Vec::new(),
    };

    let segments = line
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '.' | ':'))
        .filter(|s| !s.is_empty());

    for (idx, segment) in segments.enumerate() {
        match classify(segment) {
            Segment::Digits => {
                if tokens.bet_type_alias.is_none() {
                    tokens.number_groups.push(segment.to_string());
                } else if tokens.amount.is_none() && tokens.invalid_amount.is_none() {
                    match parse_amount(segment) {
                        Some(amount) => tokens.amount = Some(amount),
                        None => tokens.invalid_amount = Some(segment.to_string()),
                    }
                } else {
                    // Digit groups after the stake are out of grammar.
                    tokens.trailing.push(segment.to_string());
                }
            }
            Segment::Letters => {
                if idx == 0 {
                    tokens.station_marker = Some(segment.to_string());
                } else if tokens.bet_type_alias.is_none() {
                    tokens.bet_type_alias = Some(segment.to_string());
                } else {
                    tokens.trailing.push(segment.to_string());
                }
            }
            Segment::LettersThenDigits { split_at } => {
                // Alias with the stake attached: "dd10".
                let (alias, amount) = segment.split_at(split_at);
                if tokens.bet_type_alias.is_none() {
                    tokens.bet_type_alias = Some(alias.to_string());
                    match parse_amount(amount) {
                        Some(parsed) => tokens.amount = Some(parsed),
                        None => tokens.invalid_amount = Some(amount.to_string()),
                    }
                } else {
                    tokens.trailing.push(segment.to_string());
                }
            }
            Segment::DigitsThenLetters => {
                // Either a region-count station marker ("2dmn") in leading
                // position, or a combination-coded group ("234dao").
                if idx == 0 {
                    tokens.station_marker = Some(segment.to_string());
                } else {
                    tokens.number_groups.push(segment.to_string());
                }
            }
            Segment::StationList => {
                // "tp+dt" only means anything as the leading marker.
                if idx == 0 {
                    tokens.station_marker = Some(segment.to_string());
                } else {
                    tokens.trailing.push(segment.to_string());
                }
            }
            Segment::Mixed => tokens.trailing.push(segment.to_string()),
        }
    }

    tokens
}

/// Structural shape of one segment.
enum Segment {
    Digits,
    Letters,
    /// Letters then digits, split point at the first digit.
    LettersThenDigits { split_at: usize },
    DigitsThenLetters,
    /// '+'-joined station aliases ("tp+dt").
    StationList,
    Mixed,
}

fn classify(segment: &str) -> Segment {
    let chars: Vec<char> = segment.chars().collect();
    if chars.iter().all(|c| c.is_ascii_digit()) {
        return Segment::Digits;
    }
    if chars.iter().all(|c| c.is_alphabetic()) {
        return Segment::Letters;
    }
    if is_station_list(&chars) {
        return Segment::StationList;
    }

    if let Some(split_at) = letters_then_digits_split(segment, &chars) {
        return Segment::LettersThenDigits { split_at };
    }
    if is_digits_then_letters(&chars) {
        return Segment::DigitsThenLetters;
    }
    Segment::Mixed
}

/// Byte offset of the first digit, if the segment is letters followed only
/// by digits ("dd10").
fn letters_then_digits_split(segment: &str, chars: &[char]) -> Option<usize> {
    if !chars.first().is_some_and(|c| c.is_alphabetic()) {
        return None;
    }
    let first_digit = chars.iter().position(|c| c.is_ascii_digit())?;
    if !chars[first_digit..].iter().all(|c| c.is_ascii_digit()) {
        return None;
    }
    segment.char_indices().nth(first_digit).map(|(byte, _)| byte)
}

/// '+'-joined aliases ("tp+dt"): letters and at least one '+'.
fn is_station_list(chars: &[char]) -> bool {
    chars.contains(&'+')
        && chars.iter().any(|c| c.is_alphabetic())
        && chars.iter().all(|c| c.is_alphabetic() || *c == '+')
}

/// Digits followed only by letters ("2dmn", "234dao").
fn is_digits_then_letters(chars: &[char]) -> bool {
    if !chars.first().is_some_and(|c| c.is_ascii_digit()) {
        return false;
    }
    let tail = chars.iter().position(|c| !c.is_ascii_digit()).unwrap_or(chars.len());
    tail < chars.len() && chars[tail..].iter().all(|c| c.is_alphabetic())
}

/// Parse a stake token (thousands of đồng) into đồng.
fn parse_amount(token: &str) -> Option<Decimal> {
    let value: Decimal = token.parse().ok()?;
    if value <= Decimal::ZERO {
        return None;
    }
    Some(value * AMOUNT_UNIT)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
