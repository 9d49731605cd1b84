//! Kelly Criterion stake sizing for parlays.
//!
//! The Kelly formula sizes a bet to maximise the expected logarithm of wealth,
//! which balances risk and reward optimally over the long run.
//!
//! Standard formula:
//!   f* = (b·p − q) / b
//! where
//!   b  = net parlay odds (decimal odds − 1)
//!   p  = estimated probability the slip wins
//!   q  = 1 − p
//!
//! Every leg is priced at -110 (decimal 1.91), so a slip of n legs pays
//! 1.91ⁿ. The win probability is the mean leg confidence, not the product of
//! leg probabilities.
//!
//! A fractional multiplier is applied to the Kelly output, then the stake is
//! floored at $5 and capped at 10% of bankroll. When Kelly shows no edge the
//! stake falls back to a flat 1% of bankroll (still floored at $5).

use serde::Serialize;
use tracing::debug;

use crate::error::SlipError;
use crate::models::Prop;

/// Decimal odds of a single -110 leg.
pub const LEG_DECIMAL_ODDS: f64 = 1.91;
/// Quarter Kelly.
pub const DEFAULT_KELLY_MULTIPLIER: f64 = 0.25;
/// Smallest stake ever suggested.
pub const MIN_STAKE: f64 = 5.0;
/// Hard ceiling on a Kelly-derived stake, as a fraction of bankroll.
pub const MAX_STAKE_FRACTION: f64 = 0.10;
/// Flat stake used when Kelly indicates no edge.
pub const FALLBACK_STAKE_FRACTION: f64 = 0.01;

/// Full-precision sizing result. Round only when formatting for output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeRecommendation {
    pub win_probability: f64,
    pub parlay_odds: f64,
    /// Full (unscaled) Kelly fraction; may be negative or non-finite
    pub kelly_fraction: f64,
    pub stake: f64,
    pub potential_return: f64,
    /// True when the flat fallback stake was used instead of Kelly
    pub fallback: bool,
}

impl StakeRecommendation {
    pub fn suggested_bet(&self) -> String {
        format_money(self.stake)
    }

    pub fn potential_return_display(&self) -> String {
        format_money(self.potential_return)
    }
}

/// Two-decimal string for a money amount.
pub fn format_money(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Decimal odds of a parlay of `legs` legs at -110 each.
pub fn parlay_odds(legs: usize) -> f64 {
    LEG_DECIMAL_ODDS.powi(legs as i32)
}

/// Calculate the full Kelly fraction.
///
/// # Arguments
/// * `win_prob`     – Estimated probability that the slip wins (0.0–1.0).
/// * `decimal_odds` – Decimal odds of the slip (stake included).
///
/// Returns NaN or ±∞ when the odds leave no net payout.
pub fn kelly_fraction(win_prob: f64, decimal_odds: f64) -> f64 {
    let b = decimal_odds - 1.0;
    let q = 1.0 - win_prob;
    (b * win_prob - q) / b
}

pub fn validate_bankroll(bankroll: f64) -> Result<(), SlipError> {
    if !bankroll.is_finite() || bankroll <= 0.0 {
        return Err(SlipError::InvalidBankroll(bankroll));
    }
    Ok(())
}

/// Size the stake for a fixed set of legs.
///
/// # Arguments
/// * `legs`             – The slip's legs; must be non-empty.
/// * `bankroll`         – Current bankroll in dollars (> 0).
/// * `kelly_multiplier` – Fractional Kelly multiplier, usually
///                        [`DEFAULT_KELLY_MULTIPLIER`].
pub fn size_stake(
    legs: &[&Prop],
    bankroll: f64,
    kelly_multiplier: f64,
) -> Result<StakeRecommendation, SlipError> {
    if legs.is_empty() {
        return Err(SlipError::NoLegs);
    }
    validate_bankroll(bankroll)?;

    let mean_confidence = legs.iter().map(|p| p.confidence).sum::<f64>() / legs.len() as f64;
    let win_probability = mean_confidence / 100.0;
    let odds = parlay_odds(legs.len());
    let f = kelly_fraction(win_probability, odds);

    let (stake, fallback) = if f.is_finite() && f > 0.0 {
        let stake = (bankroll * f * kelly_multiplier).max(MIN_STAKE);
        (stake.min(bankroll * MAX_STAKE_FRACTION), false)
    } else {
        debug!(
            "No Kelly edge (f={:.4}, p={:.3}, odds={:.3}); using flat stake",
            f, win_probability, odds
        );
        ((bankroll * FALLBACK_STAKE_FRACTION).max(MIN_STAKE), true)
    };

    Ok(StakeRecommendation {
        win_probability,
        parlay_odds: odds,
        kelly_fraction: f,
        stake,
        potential_return: stake * odds,
        fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sport;
    use crate::slip::correlation::tests::prop;
    use approx::assert_relative_eq;

    fn legs_with(confidences: &[f64]) -> Vec<Prop> {
        confidences
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let mut p = prop(i as i64 + 1, Sport::Nba, &format!("P{}", i), "LAL", "BOS");
                p.confidence = *c;
                p
            })
            .collect()
    }

    fn size(confidences: &[f64], bankroll: f64) -> StakeRecommendation {
        let props = legs_with(confidences);
        let legs: Vec<&Prop> = props.iter().collect();
        size_stake(&legs, bankroll, DEFAULT_KELLY_MULTIPLIER).expect("valid input")
    }

    #[test]
    fn test_kelly_fraction_even_money() {
        // b = 1.0, p = 0.6, q = 0.4 → f = 0.2
        assert_relative_eq!(kelly_fraction(0.6, 2.0), 0.2, epsilon = 1e-9);
    }

    #[test]
    fn test_kelly_fraction_no_net_payout_is_not_finite() {
        assert!(!kelly_fraction(0.6, 1.0).is_finite());
    }

    #[test]
    fn test_parlay_odds() {
        assert_relative_eq!(parlay_odds(1), 1.91, epsilon = 1e-12);
        assert_relative_eq!(parlay_odds(3), 6.967871, epsilon = 1e-9);
    }

    #[test]
    fn test_three_leg_stake_hits_ceiling() {
        let rec = size(&[70.0, 65.0, 75.0], 100.0);
        assert_relative_eq!(rec.win_probability, 0.70, epsilon = 1e-12);
        assert_relative_eq!(rec.kelly_fraction, 0.6497, epsilon = 1e-4);
        assert!(!rec.fallback);
        // Quarter Kelly would be ~16.24, capped at 10% of bankroll.
        assert_eq!(rec.suggested_bet(), "10.00");
        assert_relative_eq!(rec.potential_return, 69.67871, epsilon = 1e-9);
        assert_eq!(rec.potential_return_display(), "69.68");
    }

    #[test]
    fn test_uncapped_kelly_stake() {
        // p = 0.55 on one leg: f = (0.91·0.55 − 0.45) / 0.91 ≈ 0.05549
        let rec = size(&[55.0], 1000.0);
        assert!(!rec.fallback);
        assert_relative_eq!(
            rec.stake,
            1000.0 * ((0.91 * 0.55 - 0.45) / 0.91) * 0.25,
            epsilon = 1e-9
        );
        assert_eq!(rec.suggested_bet(), "13.87");
    }

    #[test]
    fn test_min_stake_floor() {
        let rec = size(&[55.0], 100.0);
        assert!(!rec.fallback);
        assert_relative_eq!(rec.stake, MIN_STAKE, epsilon = 1e-12);
    }

    #[test]
    fn test_no_edge_falls_back_to_flat_stake() {
        // A single -110 leg needs p > 1/1.91 ≈ 0.5236 for an edge.
        let rec = size(&[40.0], 1000.0);
        assert!(rec.fallback);
        assert!(rec.kelly_fraction <= 0.0);
        assert_relative_eq!(rec.stake, 10.0, epsilon = 1e-12);

        // Four legs at 5% mean confidence: p·odds < 1.
        let rec = size(&[5.0, 5.0, 5.0, 5.0], 1000.0);
        assert!(rec.fallback);
        assert_relative_eq!(rec.stake, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fallback_floor() {
        let rec = size(&[10.0, 10.0], 200.0);
        assert!(rec.fallback);
        assert_relative_eq!(rec.stake, MIN_STAKE, epsilon = 1e-12);
    }

    #[test]
    fn test_stake_within_bounds() {
        for bankroll in [50.0, 100.0, 250.0, 1000.0, 25_000.0] {
            for c in [0.0, 20.0, 45.0, 52.0, 55.0, 60.0, 70.0, 85.0, 100.0] {
                for n in 1..=6 {
                    let rec = size(&vec![c; n], bankroll);
                    assert!(rec.stake >= MIN_STAKE - 1e-9, "{} {} {}", bankroll, c, n);
                    assert!(
                        rec.stake <= bankroll * MAX_STAKE_FRACTION + 1e-9,
                        "{} {} {}",
                        bankroll,
                        c,
                        n
                    );
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_confidence_does_not_panic() {
        let rec = size(&[150.0, 120.0], 100.0);
        assert!(rec.stake.is_finite());
        let rec = size(&[-20.0], 100.0);
        assert!(rec.fallback);
    }

    #[test]
    fn test_rejects_empty_legs_and_bad_bankroll() {
        assert_eq!(size_stake(&[], 100.0, 0.25), Err(SlipError::NoLegs));
        let props = legs_with(&[60.0]);
        let legs: Vec<&Prop> = props.iter().collect();
        assert!(matches!(
            size_stake(&legs, 0.0, 0.25),
            Err(SlipError::InvalidBankroll(_))
        ));
        assert!(matches!(
            size_stake(&legs, f64::NAN, 0.25),
            Err(SlipError::InvalidBankroll(_))
        ));
    }
}
