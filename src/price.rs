//! Stake and prize calculation.
//!
//! All monetary math uses `Decimal`, multiplied in a fixed order and rounded
//! to the nearest đồng once at the final step, so repeated parses of the
//! same input price identically with no cumulative rounding drift.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::types::{BetType, CommissionSettings};

/// Priced amounts for one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedLine {
    pub multiplier: Decimal,
    pub payout_rate: Decimal,
    /// amount × price_rate × multiplier × number count.
    pub stake: Decimal,
    /// Same formula at the export rate.
    pub export_stake: Decimal,
    /// Same formula at the return rate.
    pub return_stake: Decimal,
    /// amount × payout rate × prize units.
    pub potential_prize: Decimal,
}

/// Price one line.
///
/// `amount` is the base amount in đồng, `number_count` the distinct numbers
/// staked, `prize_units` the count-dependent prize multiplier (permutation
/// count for permutation bet types, 1 otherwise). Commission rates must
/// already be validated; this function only multiplies.
pub fn price_line(
    amount: Decimal,
    number_count: usize,
    prize_units: usize,
    bet_type: &BetType,
    commission: &CommissionSettings,
) -> PricedLine {
    let multiplier = bet_type.effective_multiplier();
    let payout_rate = bet_type.effective_payout_rate();
    let count = Decimal::from(number_count);

    // Multiplication order is part of the contract: amount, rate,
    // multiplier, count — round once at the end.
    let stake = round(amount * commission.price_rate * multiplier * count);
    let export_stake = round(amount * commission.export_price_rate * multiplier * count);
    let return_stake = round(amount * commission.return_price_rate * multiplier * count);
    let potential_prize = round(amount * payout_rate * Decimal::from(prize_units));

    debug!(
        %amount,
        number_count,
        prize_units,
        %stake,
        %potential_prize,
        bet_type = %bet_type.name,
        "Line priced"
    );

    PricedLine {
        multiplier,
        payout_rate,
        stake,
        export_stake,
        return_stake,
        potential_prize,
    }
}

/// Round to the nearest đồng, half away from zero.
fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures;
    use rust_decimal_macros::dec;

    #[test]
    fn test_stake_formula() {
        let settings = CommissionSettings::default();
        for (count, expected) in [(1, dec!(8000)), (2, dec!(16000)), (5, dec!(40000))] {
            let priced = price_line(dec!(10000), count, 1, &fixtures::dau_duoi(), &settings);
            assert_eq!(priced.stake, expected, "count {count}");
        }
    }

    #[test]
    fn test_export_and_return_stakes() {
        let settings = CommissionSettings::default();
        let priced = price_line(dec!(10000), 2, 1, &fixtures::dau_duoi(), &settings);
        assert_eq!(priced.export_stake, dec!(14800)); // 10000 × 0.74 × 1 × 2
        assert_eq!(priced.return_stake, dec!(19000)); // 10000 × 0.95 × 1 × 2
    }

    #[test]
    fn test_potential_prize() {
        let settings = CommissionSettings::default();
        let priced = price_line(dec!(10000), 2, 1, &fixtures::dau_duoi(), &settings);
        assert_eq!(priced.potential_prize, dec!(750000)); // 10000 × 75 × 1
    }

    #[test]
    fn test_permutation_prize_units() {
        let settings = CommissionSettings::default();
        // 3-digit permutation type, 6 permutations covered.
        let priced = price_line(dec!(5000), 6, 6, &fixtures::xiu_chu_dao(), &settings);
        assert_eq!(priced.potential_prize, dec!(19500000)); // 5000 × 650 × 6
        assert_eq!(priced.stake, dec!(24000)); // 5000 × 0.8 × 1 × 6
    }

    #[test]
    fn test_custom_overrides_used() {
        let settings = CommissionSettings::default();
        let mut bt = fixtures::dau_duoi();
        bt.custom_payout_rate = Some(dec!(70));
        bt.custom_multiplier = Some(dec!(2));
        let priced = price_line(dec!(10000), 1, 1, &bt, &settings);
        assert_eq!(priced.multiplier, dec!(2));
        assert_eq!(priced.payout_rate, dec!(70));
        assert_eq!(priced.stake, dec!(16000)); // 10000 × 0.8 × 2 × 1
        assert_eq!(priced.potential_prize, dec!(700000));
    }

    #[test]
    fn test_rounding_happens_once_at_the_end() {
        let settings = CommissionSettings {
            price_rate: dec!(0.333),
            ..Default::default()
        };
        // 1010 × 0.333 = 336.33 → ×1 ×3 = 1008.99 → rounds to 1009.
        // Per-term rounding (336.33 → 336, × 3 = 1008) would drift.
        let priced = price_line(dec!(1010), 3, 1, &fixtures::dau_duoi(), &settings);
        assert_eq!(priced.stake, dec!(1009));
        let single = price_line(dec!(1010), 1, 1, &fixtures::dau_duoi(), &settings);
        assert_eq!(single.stake, dec!(336));
    }
}
