use serde::Serialize;

use crate::error::SlipError;

/// Named configuration for automatic slip construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub name: &'static str,
    /// Props below this confidence are never considered
    pub min_confidence: f64,
    /// Inclusive `(min, max)` leg count
    pub target_props: (usize, usize),
    /// Candidates scoring at or above this against any chosen leg are skipped
    pub max_correlation: f64,
}

pub const CONSERVATIVE: RiskProfile = RiskProfile {
    name: "conservative",
    min_confidence: 60.0,
    target_props: (2, 3),
    max_correlation: 0.4,
};

pub const BALANCED: RiskProfile = RiskProfile {
    name: "balanced",
    min_confidence: 55.0,
    target_props: (3, 4),
    max_correlation: 0.6,
};

pub const AGGRESSIVE: RiskProfile = RiskProfile {
    name: "aggressive",
    min_confidence: 50.0,
    target_props: (5, 6),
    max_correlation: 0.8,
};

/// Canonical profiles, safest first.
pub static PROFILES: [RiskProfile; 3] = [CONSERVATIVE, BALANCED, AGGRESSIVE];

impl RiskProfile {
    pub fn min_legs(&self) -> usize {
        self.target_props.0
    }

    pub fn max_legs(&self) -> usize {
        self.target_props.1
    }

    /// Look up a canonical profile, ignoring case and surrounding whitespace.
    pub fn by_name(name: &str) -> Result<&'static RiskProfile, SlipError> {
        let wanted = name.trim().to_lowercase();
        PROFILES
            .iter()
            .find(|p| p.name == wanted)
            .ok_or_else(|| SlipError::UnknownProfile(name.to_string()))
    }

    /// Display form of the name, e.g. "Balanced".
    pub fn label(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_values() {
        assert_eq!(CONSERVATIVE.target_props, (2, 3));
        assert_eq!(BALANCED.min_confidence, 55.0);
        assert_eq!(AGGRESSIVE.max_correlation, 0.8);
        for p in PROFILES {
            assert!(p.min_legs() >= 2);
            assert!(p.min_legs() <= p.max_legs());
            assert!((0.0..=1.0).contains(&p.max_correlation));
        }
    }

    #[test]
    fn test_by_name() {
        assert_eq!(RiskProfile::by_name(" Balanced ").unwrap().name, "balanced");
        assert!(matches!(
            RiskProfile::by_name("yolo"),
            Err(SlipError::UnknownProfile(_))
        ));
    }

    #[test]
    fn test_label() {
        assert_eq!(AGGRESSIVE.label(), "Aggressive");
    }
}
