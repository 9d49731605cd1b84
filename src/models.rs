use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Leagues a prop can be quoted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sport {
    Nhl,
    Nba,
    Nfl,
    Mlb,
}

impl Sport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Nhl => "NHL",
            Sport::Nba => "NBA",
            Sport::Nfl => "NFL",
            Sport::Mlb => "MLB",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Over,
    Under,
}

/// Scheduled start of the game a prop belongs to.
///
/// Upstream feeds disagree on representation: some send epoch milliseconds,
/// some RFC 3339 instants, some loose ISO-8601 text. All of them must collapse
/// to the same epoch-millisecond value before game keys are compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameTime {
    Millis(i64),
    Instant(DateTime<Utc>),
    Text(String),
}

impl GameTime {
    /// Epoch milliseconds, or `None` when a text value cannot be parsed.
    pub fn epoch_millis(&self) -> Option<i64> {
        match self {
            GameTime::Millis(ms) => Some(*ms),
            GameTime::Instant(dt) => Some(dt.timestamp_millis()),
            GameTime::Text(s) => parse_timestamp_millis(s),
        }
    }
}

impl From<DateTime<Utc>> for GameTime {
    fn from(dt: DateTime<Utc>) -> Self {
        GameTime::Instant(dt)
    }
}

impl From<&str> for GameTime {
    fn from(s: &str) -> Self {
        GameTime::Text(s.to_string())
    }
}

/// Parse the ISO-8601 shapes seen in prop feeds. Offset-less values are UTC.
fn parse_timestamp_millis(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(ms) = s.parse::<i64>() {
        return Some(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// A single player-statistic wager, as supplied by the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prop {
    pub id: i64,
    pub sport: Sport,
    pub player: String,
    pub team: String,
    pub opponent: String,
    /// Free-text stat label, e.g. "SOG" or "Rec Yds"
    pub stat: String,
    pub line: f64,
    pub direction: Direction,
    /// Model confidence, nominally 0–100
    pub confidence: f64,
    pub platform: String,
    pub game_time: GameTime,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningType {
    SameGame,
    SameTeam,
    SamePlayer,
    StatRelated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Flag raised when two or more props are not statistically independent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationWarning {
    #[serde(rename = "type")]
    pub warning_type: WarningType,
    pub severity: Severity,
    pub description: String,
    pub prop_ids: Vec<i64>,
}

/// One leg of a slip as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pick {
    pub prop_id: i64,
    pub player: String,
    pub stat: String,
    pub line: f64,
    pub direction: Direction,
    pub confidence: f64,
}

impl From<&Prop> for Pick {
    fn from(prop: &Prop) -> Self {
        Pick {
            prop_id: prop.id,
            player: prop.player.clone(),
            stat: prop.stat.clone(),
            line: prop.line,
            direction: prop.direction,
            confidence: prop.confidence,
        }
    }
}

/// A priced multi-leg parlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slip {
    pub title: String,
    /// Risk profile name, or "custom" for a manually built slip
    #[serde(rename = "type")]
    pub slip_type: String,
    pub picks: Vec<Pick>,
    /// Rounded mean of the leg confidences
    pub confidence: i64,
    /// Stake, two decimal places
    pub suggested_bet: String,
    /// Stake × parlay odds, two decimal places
    pub potential_return: String,
    pub platform: String,
    pub warnings_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_game_time_representations_agree() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 15, 19, 0, 0).unwrap();
        let expected = instant.timestamp_millis();

        assert_eq!(GameTime::from(instant).epoch_millis(), Some(expected));
        assert_eq!(GameTime::Millis(expected).epoch_millis(), Some(expected));
        assert_eq!(
            GameTime::from("2024-01-15T19:00:00Z").epoch_millis(),
            Some(expected)
        );
        assert_eq!(
            GameTime::from("2024-01-15T19:00:00.000Z").epoch_millis(),
            Some(expected)
        );
        assert_eq!(
            GameTime::from("2024-01-15T14:00:00-05:00").epoch_millis(),
            Some(expected)
        );
        assert_eq!(
            GameTime::from("2024-01-15T19:00:00").epoch_millis(),
            Some(expected)
        );
    }

    #[test]
    fn test_game_time_bare_date_is_utc_midnight() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(
            GameTime::from("2024-01-15").epoch_millis(),
            Some(midnight.timestamp_millis())
        );
    }

    #[test]
    fn test_game_time_garbage_is_none() {
        assert_eq!(GameTime::from("tonight").epoch_millis(), None);
        assert_eq!(GameTime::from("   ").epoch_millis(), None);
    }

    #[test]
    fn test_prop_deserializes_wire_shape() {
        let raw = serde_json::json!({
            "id": 7,
            "sport": "NHL",
            "player": "Connor McDavid",
            "team": "EDM",
            "opponent": "CGY",
            "stat": "SOG",
            "line": 3.5,
            "direction": "over",
            "confidence": 72.0,
            "platform": "PrizePicks",
            "gameTime": "2024-01-15T19:00:00Z",
            "isActive": true
        });
        let prop: Prop = serde_json::from_value(raw).expect("prop should parse");
        assert_eq!(prop.sport, Sport::Nhl);
        assert_eq!(prop.direction, Direction::Over);
        assert!(matches!(prop.game_time, GameTime::Instant(_)));

        let numeric: GameTime = serde_json::from_value(serde_json::json!(1705345200000i64))
            .expect("millis should parse");
        assert_eq!(numeric.epoch_millis(), prop.game_time.epoch_millis());
    }

    #[test]
    fn test_warning_serializes_kebab_type() {
        let w = CorrelationWarning {
            warning_type: WarningType::StatRelated,
            severity: Severity::Medium,
            description: "x".into(),
            prop_ids: vec![1, 2],
        };
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["type"], "stat-related");
        assert_eq!(v["severity"], "medium");
        assert_eq!(v["propIds"], serde_json::json!([1, 2]));
    }
}
