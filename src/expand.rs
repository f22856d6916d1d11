//! Number-combination expansion.
//!
//! Turns the tokenizer's digit groups into the explicit list of numbers a
//! line stakes: combination-coded groups ("234dao") expand per their
//! definition, permutation bet types expand every literal number, and pair
//! bet types link the line's numbers into pairs. Expansion is bounded so a
//! malformed input can't blow up memory.

use tracing::debug;

use crate::alias;
use crate::permute;
use crate::types::{BetType, ExpansionRule, LineError, NumberCombination};

/// Upper bound on the numbers one line may expand to.
pub const MAX_EXPANSION: usize = 64;

/// Result of expanding one line's digit groups.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedNumbers {
    /// Distinct numbers staked, in first-appearance order.
    pub numbers: Vec<String>,
    /// Largest permutation-set size among the line's base numbers: the
    /// count-dependent prize multiplier for permutation bet types (1 when
    /// no permutation expansion happened).
    pub prize_units: usize,
    /// Whether any permutation expansion happened.
    pub is_permutation: bool,
}

/// Expand a line's digit groups for the given bet type.
pub fn expand(
    groups: &[String],
    combinations: &[NumberCombination],
    bet_type: &BetType,
) -> Result<ExpandedNumbers, LineError> {
    if groups.is_empty() {
        return Err(LineError::NoNumbers);
    }

    let mut base_numbers: Vec<String> = Vec::new();
    let mut numbers: Vec<String> = Vec::new();
    let mut prize_units = 1usize;
    let mut is_permutation = false;

    for group in groups {
        let (digits, combination) = split_group(group, combinations, bet_type)?;
        check_length(&digits, bet_type)?;
        base_numbers.push(digits.clone());

        let permute_group = bet_type.is_permutation()
            || matches!(
                combination.map(|c| c.rule),
                Some(ExpansionRule::Permutation)
            );

        if permute_group {
            let count = permute::count_permutations(&digits);
            if count > MAX_EXPANSION {
                return Err(LineError::TooManyPermutations(group.clone()));
            }
            is_permutation = true;
            prize_units = prize_units.max(count);
            for perm in permute::generate_permutations(&digits) {
                push_distinct(&mut numbers, perm);
            }
        } else {
            push_distinct(&mut numbers, digits);
        }

        if numbers.len() > MAX_EXPANSION {
            return Err(LineError::TooManyPermutations(group.clone()));
        }
    }

    // Pair bet types link the line's base numbers rather than staking them
    // individually.
    if let Some(rule) = pair_rule(bet_type, combinations) {
        numbers = pair_numbers(&base_numbers, rule)?;
    }

    debug!(
        groups = groups.len(),
        expanded = numbers.len(),
        prize_units,
        is_permutation,
        "Numbers expanded"
    );

    Ok(ExpandedNumbers { numbers, prize_units, is_permutation })
}

/// Split a group into its digit part and an optional combination suffix.
///
/// A non-digit suffix must fold-match an active combination applicable to
/// the bet type, otherwise the group is malformed.
fn split_group<'a>(
    group: &str,
    combinations: &'a [NumberCombination],
    bet_type: &BetType,
) -> Result<(String, Option<&'a NumberCombination>), LineError> {
    let digit_end = group.chars().take_while(|c| c.is_ascii_digit()).count();
    let digits: String = group.chars().take(digit_end).collect();
    let suffix: String = group.chars().skip(digit_end).collect();

    if digits.is_empty() {
        return Err(LineError::Malformed(group.to_string()));
    }
    if suffix.is_empty() {
        return Ok((digits, None));
    }

    let combination = combinations
        .iter()
        .filter(|c| c.is_active && c.applies_to(bet_type.id))
        .find(|c| alias::matches(&suffix, &c.name, &c.aliases))
        .ok_or_else(|| LineError::Malformed(group.to_string()))?;

    // Pair combinations link whole numbers; a suffix form makes no sense.
    if matches!(combination.rule, ExpansionRule::Pairs { .. }) {
        return Err(LineError::Malformed(group.to_string()));
    }

    Ok((digits, Some(combination)))
}

fn check_length(digits: &str, bet_type: &BetType) -> Result<(), LineError> {
    let got = digits.chars().count();
    if got != bet_type.number_length {
        return Err(LineError::InvalidNumberLength {
            number: digits.to_string(),
            expected: bet_type.number_length,
            got,
        });
    }
    Ok(())
}

/// Whether the bet type implies a pair combination (đá/xiên), and if so
/// whether pairs are ordered.
fn pair_rule(bet_type: &BetType, combinations: &[NumberCombination]) -> Option<bool> {
    bet_type
        .combination_ids
        .iter()
        .filter_map(|id| combinations.iter().find(|c| c.id == *id && c.is_active))
        .find_map(|c| match c.rule {
            ExpansionRule::Pairs { ordered } => Some(ordered),
            _ => None,
        })
}

/// Link distinct base numbers into pairs, joined as "a-b".
fn pair_numbers(base: &[String], ordered: bool) -> Result<Vec<String>, LineError> {
    let mut distinct: Vec<&String> = Vec::new();
    for n in base {
        if !distinct.contains(&n) {
            distinct.push(n);
        }
    }
    if distinct.len() < 2 {
        return Err(LineError::NoNumbers);
    }

    let mut pairs = Vec::new();
    for i in 0..distinct.len() {
        for j in (i + 1)..distinct.len() {
            pairs.push(format!("{}-{}", distinct[i], distinct[j]));
            if ordered {
                pairs.push(format!("{}-{}", distinct[j], distinct[i]));
            }
        }
    }
    if pairs.len() > MAX_EXPANSION {
        return Err(LineError::TooManyPermutations(base.join(" ")));
    }
    Ok(pairs)
}

fn push_distinct(numbers: &mut Vec<String>, candidate: String) {
    if !numbers.contains(&candidate) {
        numbers.push(candidate);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures;

    fn combos() -> Vec<NumberCombination> {
        vec![fixtures::dao_combination(), fixtures::pair_combination()]
    }

    fn groups(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_literal_numbers_pass_through() {
        let result = expand(&groups(&["23", "45"]), &combos(), &fixtures::dau_duoi()).unwrap();
        assert_eq!(result.numbers, vec!["23", "45"]);
        assert_eq!(result.prize_units, 1);
        assert!(!result.is_permutation);
    }

    #[test]
    fn test_duplicates_collapse() {
        let result =
            expand(&groups(&["23", "23", "45"]), &combos(), &fixtures::dau_duoi()).unwrap();
        assert_eq!(result.numbers, vec!["23", "45"]);
    }

    #[test]
    fn test_no_groups_is_error() {
        let err = expand(&[], &combos(), &fixtures::dau_duoi()).unwrap_err();
        assert_eq!(err, LineError::NoNumbers);
    }

    #[test]
    fn test_length_mismatch() {
        let err = expand(&groups(&["234"]), &combos(), &fixtures::dau_duoi()).unwrap_err();
        assert_eq!(
            err,
            LineError::InvalidNumberLength {
                number: "234".into(),
                expected: 2,
                got: 3
            }
        );
    }

    #[test]
    fn test_dao_suffix_expands_permutations() {
        // Xỉu chủ (3-digit, non-permutation method) with an explicit đảo
        // suffix. Build a non-permutation 3-digit type for this.
        let mut xc = fixtures::xiu_chu_dao();
        xc.match_method = crate::types::MatchMethod::Exact;
        let result = expand(&groups(&["234dao"]), &combos(), &xc).unwrap();
        assert_eq!(result.numbers.len(), 6);
        assert!(result.is_permutation);
        assert_eq!(result.prize_units, 6);
        assert!(result.numbers.contains(&"432".to_string()));
    }

    #[test]
    fn test_permutation_bet_type_expands_literals() {
        let result = expand(&groups(&["455"]), &combos(), &fixtures::xiu_chu_dao()).unwrap();
        // 455 has 3 distinct permutations.
        assert_eq!(result.numbers.len(), 3);
        assert_eq!(result.prize_units, 3);
        assert!(result.is_permutation);
    }

    #[test]
    fn test_prize_units_takes_largest_expansion() {
        let result =
            expand(&groups(&["123", "455"]), &combos(), &fixtures::xiu_chu_dao()).unwrap();
        assert_eq!(result.prize_units, 6);
        assert_eq!(result.numbers.len(), 9);
    }

    #[test]
    fn test_unknown_suffix_is_malformed() {
        let err = expand(&groups(&["23zz"]), &combos(), &fixtures::dau_duoi()).unwrap_err();
        assert_eq!(err, LineError::Malformed("23zz".into()));
    }

    #[test]
    fn test_pair_bet_type_links_numbers() {
        let result = expand(&groups(&["23", "45", "67"]), &combos(), &fixtures::da()).unwrap();
        assert_eq!(result.numbers, vec!["23-45", "23-67", "45-67"]);
        assert_eq!(result.prize_units, 1);
    }

    #[test]
    fn test_pair_bet_type_needs_two_numbers() {
        let err = expand(&groups(&["23"]), &combos(), &fixtures::da()).unwrap_err();
        assert_eq!(err, LineError::NoNumbers);
    }

    #[test]
    fn test_ordered_pairs() {
        let mut combo = fixtures::pair_combination();
        combo.rule = ExpansionRule::Pairs { ordered: true };
        let result = expand(
            &groups(&["23", "45"]),
            &[fixtures::dao_combination(), combo],
            &fixtures::da(),
        )
        .unwrap();
        assert_eq!(result.numbers, vec!["23-45", "45-23"]);
    }

    #[test]
    fn test_permutation_count_over_bound_is_rejected() {
        // A 5-digit permutation type: 12345 has 120 arrangements.
        let mut wide = fixtures::xiu_chu_dao();
        wide.number_length = 5;
        let err = expand(&groups(&["12345"]), &combos(), &wide).unwrap_err();
        assert_eq!(err, LineError::TooManyPermutations("12345".into()));
    }

    #[test]
    fn test_pair_count_over_bound_is_rejected() {
        // 13 distinct numbers pair into C(13,2) = 78 wagers.
        let items: Vec<String> = (10..23).map(|n| n.to_string()).collect();
        let err = expand(&items, &combos(), &fixtures::da()).unwrap_err();
        assert!(matches!(err, LineError::TooManyPermutations(_)));
    }

    #[test]
    fn test_pair_suffix_is_malformed() {
        let err = expand(&groups(&["23xien"]), &combos(), &fixtures::da()).unwrap_err();
        assert_eq!(err, LineError::Malformed("23xien".into()));
    }
}
