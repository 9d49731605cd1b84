use tracing::debug;

use crate::models::Prop;

use super::correlation::has_high_correlation;
use super::profile::RiskProfile;

/// Greedily pick legs for one risk profile.
///
/// Eligible props (active, at or above the profile's confidence floor) are
/// walked in descending confidence order, ties keeping their input order.
/// A candidate too correlated with any already chosen leg is skipped and the
/// walk continues; nothing is ever revisited or swapped out. Returns an empty
/// list when fewer than `target_props.0` legs survive.
pub fn generate_slip_for_profile<'a>(props: &'a [Prop], profile: &RiskProfile) -> Vec<&'a Prop> {
    let mut eligible: Vec<&Prop> = props
        .iter()
        .filter(|p| p.is_active && p.confidence >= profile.min_confidence)
        .collect();
    // Stable, so equal confidences keep feed order.
    eligible.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut selected: Vec<&Prop> = Vec::with_capacity(profile.max_legs());
    for candidate in eligible {
        if selected.len() >= profile.max_legs() {
            break;
        }
        if !selected.is_empty()
            && has_high_correlation(candidate, &selected, profile.max_correlation)
        {
            debug!(
                "{}: skipping prop {} ({} {}), correlated with selection",
                profile.name, candidate.id, candidate.player, candidate.stat
            );
            continue;
        }
        selected.push(candidate);
    }

    if selected.len() < profile.min_legs() {
        debug!(
            "{}: only {} leg(s) available, need {}",
            profile.name,
            selected.len(),
            profile.min_legs()
        );
        return Vec::new();
    }
    selected
}
