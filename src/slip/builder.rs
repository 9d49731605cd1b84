use serde::Serialize;
use tracing::debug;

use crate::error::SlipError;
use crate::models::{CorrelationWarning, Pick, Prop, Slip};

use super::correlation::detect_correlations;
use super::kelly::{size_stake, validate_bankroll, StakeRecommendation};
use super::profile::{RiskProfile, PROFILES};
use super::selector::generate_slip_for_profile;

/// Slip type used for user-assembled slips.
pub const CUSTOM_SLIP_TYPE: &str = "custom";
/// Platform label when legs come from more than one book.
pub const MULTIPLE_PLATFORMS: &str = "Multiple";

/// A priced slip together with the warnings raised over its legs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipAnalysis {
    pub slip: Slip,
    pub warnings: Vec<CorrelationWarning>,
    pub stake: StakeRecommendation,
}

fn slip_platform(legs: &[&Prop]) -> String {
    match legs.split_first() {
        Some((first, rest)) if rest.iter().all(|p| p.platform == first.platform) => {
            first.platform.clone()
        }
        _ => MULTIPLE_PLATFORMS.to_string(),
    }
}

fn assemble(
    title: String,
    slip_type: &str,
    legs: &[&Prop],
    bankroll: f64,
    kelly_multiplier: f64,
) -> Result<SlipAnalysis, SlipError> {
    let stake = size_stake(legs, bankroll, kelly_multiplier)?;
    let owned: Vec<Prop> = legs.iter().map(|p| (*p).clone()).collect();
    let warnings = detect_correlations(&owned);
    let mean_confidence = legs.iter().map(|p| p.confidence).sum::<f64>() / legs.len() as f64;

    let slip = Slip {
        title,
        slip_type: slip_type.to_string(),
        picks: legs.iter().map(|p| Pick::from(*p)).collect(),
        confidence: mean_confidence.round() as i64,
        suggested_bet: stake.suggested_bet(),
        potential_return: stake.potential_return_display(),
        platform: slip_platform(legs),
        warnings_count: warnings.len(),
    };
    Ok(SlipAnalysis {
        slip,
        warnings,
        stake,
    })
}

/// Select and price a slip for one profile. `Ok(None)` when the pool cannot
/// fill the profile's minimum leg count.
pub fn analyze_profile(
    props: &[Prop],
    profile: &RiskProfile,
    bankroll: f64,
    kelly_multiplier: f64,
) -> Result<Option<SlipAnalysis>, SlipError> {
    validate_bankroll(bankroll)?;
    let legs = generate_slip_for_profile(props, profile);
    if legs.is_empty() {
        return Ok(None);
    }
    let title = format!("{} {}-Leg Parlay", profile.label(), legs.len());
    assemble(title, profile.name, &legs, bankroll, kelly_multiplier).map(Some)
}

pub fn build_slip(
    props: &[Prop],
    profile: &RiskProfile,
    bankroll: f64,
    kelly_multiplier: f64,
) -> Result<Option<Slip>, SlipError> {
    Ok(analyze_profile(props, profile, bankroll, kelly_multiplier)?.map(|a| a.slip))
}

/// Run every canonical profile over the same pool, safest first. Profiles
/// that produce nothing are omitted.
pub fn build_all_slips(
    props: &[Prop],
    bankroll: f64,
    kelly_multiplier: f64,
) -> Result<Vec<Slip>, SlipError> {
    let mut slips = Vec::new();
    for profile in PROFILES.iter() {
        match build_slip(props, profile, bankroll, kelly_multiplier)? {
            Some(slip) => slips.push(slip),
            None => debug!("No {} slip from {} props", profile.name, props.len()),
        }
    }
    Ok(slips)
}

/// Price a user-assembled slip as given: no filtering, no reordering.
pub fn analyze_slip(
    legs: &[Prop],
    bankroll: f64,
    kelly_multiplier: f64,
) -> Result<SlipAnalysis, SlipError> {
    let refs: Vec<&Prop> = legs.iter().collect();
    let title = format!("Custom {}-Leg Parlay", refs.len());
    assemble(title, CUSTOM_SLIP_TYPE, &refs, bankroll, kelly_multiplier)
}

pub fn price_manual_slip(
    legs: &[Prop],
    bankroll: f64,
    kelly_multiplier: f64,
) -> Result<Slip, SlipError> {
    analyze_slip(legs, bankroll, kelly_multiplier).map(|a| a.slip)
}
