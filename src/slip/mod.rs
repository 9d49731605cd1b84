pub mod builder;
pub mod correlation;
pub mod kelly;
pub mod profile;
pub mod selector;

pub use builder::{
    analyze_profile, analyze_slip, build_all_slips, build_slip, price_manual_slip, SlipAnalysis,
};
pub use correlation::{
    correlation_score, detect_correlations, game_key, has_high_correlation, normalize_name,
    normalize_stat,
};
pub use kelly::{size_stake, StakeRecommendation, DEFAULT_KELLY_MULTIPLIER};
pub use profile::{RiskProfile, AGGRESSIVE, BALANCED, CONSERVATIVE, PROFILES};
pub use selector::generate_slip_for_profile;
