//! Correlation detection between player props.
//!
//! Props that share a game, a team, or a player do not resolve independently,
//! so a parlay built from them carries more variance than its quoted odds
//! suggest. This module scores pairs of props and raises warnings for groups
//! that move together.
//!
//! Three kinds of link are recognised:
//! - **Same game**: both props resolve in one real-world event
//! - **Same team / same player**: outcomes share a lineup or an individual
//! - **Stat-related**: one stat mechanically contains another (goals ⊂ points)

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::Hash;

use crate::models::{CorrelationWarning, GameTime, Prop, Severity, Sport, WarningType};

/// Score contribution when both props are on the same player.
const SAME_PLAYER_WEIGHT: f64 = 0.8;
/// Score contribution when both props resolve in the same game.
const SAME_GAME_WEIGHT: f64 = 0.6;
/// Score contribution for teammates (same team, different players).
const SAME_TEAM_WEIGHT: f64 = 0.3;

// ── Static tables ────────────────────────────────────────────────────────────

/// Stat label spellings seen across platforms, keyed by the lowercased,
/// whitespace-collapsed label.
const STAT_ALIASES: &[(&str, &str)] = &[
    // Hockey
    ("sog", "sog"),
    ("shots on goal", "sog"),
    ("shots", "sog"),
    ("goals", "goals"),
    ("goal", "goals"),
    ("g", "goals"),
    ("saves", "saves"),
    ("sv", "saves"),
    ("goalie saves", "saves"),
    ("blocked shots", "blocked-shots"),
    ("power play points", "pp-points"),
    ("ppp", "pp-points"),
    // Shared scoring stats
    ("points", "points"),
    ("point", "points"),
    ("pts", "points"),
    ("p", "points"),
    ("assists", "assists"),
    ("assist", "assists"),
    ("ast", "assists"),
    ("a", "assists"),
    // Basketball
    ("rebounds", "rebounds"),
    ("rebound", "rebounds"),
    ("reb", "rebounds"),
    ("rebs", "rebounds"),
    ("3pm", "threes"),
    ("3-pt made", "threes"),
    ("3-pointers made", "threes"),
    ("three pointers made", "threes"),
    ("threes", "threes"),
    ("steals", "steals"),
    ("stl", "steals"),
    ("blocks", "blocks"),
    ("blk", "blocks"),
    ("turnovers", "turnovers"),
    ("pra", "pra"),
    ("pts+reb+ast", "pra"),
    ("pts+rebs+asts", "pra"),
    ("points+rebounds+assists", "pra"),
    // Football
    ("pass yds", "pass-yards"),
    ("pass yards", "pass-yards"),
    ("passing yards", "pass-yards"),
    ("pass tds", "pass-tds"),
    ("pass td", "pass-tds"),
    ("passing tds", "pass-tds"),
    ("passing touchdowns", "pass-tds"),
    ("pass attempts", "pass-attempts"),
    ("pass att", "pass-attempts"),
    ("completions", "completions"),
    ("pass completions", "completions"),
    ("interceptions", "interceptions"),
    ("ints", "interceptions"),
    ("int", "interceptions"),
    ("rush yds", "rush-yards"),
    ("rush yards", "rush-yards"),
    ("rushing yards", "rush-yards"),
    ("rush att", "rush-attempts"),
    ("rush attempts", "rush-attempts"),
    ("rushing attempts", "rush-attempts"),
    ("carries", "rush-attempts"),
    ("rush tds", "rush-tds"),
    ("rush td", "rush-tds"),
    ("rushing tds", "rush-tds"),
    ("rushing touchdowns", "rush-tds"),
    ("receptions", "receptions"),
    ("rec", "receptions"),
    ("catches", "receptions"),
    ("rec yds", "rec-yards"),
    ("rec yards", "rec-yards"),
    ("receiving yards", "rec-yards"),
    // Baseball
    ("hits", "hits"),
    ("h", "hits"),
    ("total bases", "total-bases"),
    ("tb", "total-bases"),
    ("strikeouts", "strikeouts"),
    ("pitcher strikeouts", "strikeouts"),
    ("k", "strikeouts"),
    ("ks", "strikeouts"),
    ("so", "strikeouts"),
    ("pitcher wins", "pitcher-wins"),
    ("pitcher win", "pitcher-wins"),
    ("win", "pitcher-wins"),
    ("w", "pitcher-wins"),
    ("runs+rbis", "runs-rbis"),
    ("runs + rbis", "runs-rbis"),
    ("r+rbi", "runs-rbis"),
    ("runs+rbi", "runs-rbis"),
    ("rbis", "rbis"),
    ("rbi", "rbis"),
    ("home runs", "home-runs"),
    ("hr", "home-runs"),
    ("earned runs", "earned-runs"),
    ("er", "earned-runs"),
    ("walks", "walks"),
    ("bb", "walks"),
    ("pitching outs", "pitching-outs"),
    ("outs", "pitching-outs"),
];

const NHL_RELATED: &[(&str, &str)] = &[("points", "goals"), ("points", "assists"), ("sog", "goals")];

const NBA_RELATED: &[(&str, &str)] = &[
    ("points", "rebounds"),
    ("points", "assists"),
    ("assists", "rebounds"),
];

const NFL_RELATED: &[(&str, &str)] = &[
    ("pass-yards", "pass-tds"),
    ("rush-yards", "rush-attempts"),
    ("rush-yards", "rush-tds"),
    ("receptions", "rec-yards"),
];

const MLB_RELATED: &[(&str, &str)] = &[
    ("hits", "total-bases"),
    ("strikeouts", "pitcher-wins"),
    ("runs-rbis", "hits"),
];

/// Stat pairs where one outcome mechanically feeds the other.
pub fn related_stat_pairs(sport: Sport) -> &'static [(&'static str, &'static str)] {
    match sport {
        Sport::Nhl => NHL_RELATED,
        Sport::Nba => NBA_RELATED,
        Sport::Nfl => NFL_RELATED,
        Sport::Mlb => MLB_RELATED,
    }
}

// ── Normalisation ────────────────────────────────────────────────────────────

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical form of a player name: trimmed, lowercased, single-spaced.
pub fn normalize_name(player: &str) -> String {
    collapse_whitespace(&player.to_lowercase())
}

/// Map a platform's stat label onto one canonical token per statistic.
///
/// Unknown labels come back lowercased with spaces hyphenated, so two
/// identical unknown labels still compare equal.
pub fn normalize_stat(stat: &str) -> String {
    let key = collapse_whitespace(&stat.to_lowercase());
    STAT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| key.replace(' ', "-"))
}

/// Start-time component of a [`GameKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KickoffKey {
    Millis(i64),
    /// Text that no known timestamp format accepted. Two props only merge
    /// on this if their raw text matches exactly.
    Unparsed(String),
}

/// Identity of a real-world game, independent of which side a prop is quoted
/// from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameKey {
    pub sport: Sport,
    /// `{team, opponent}` sorted lexicographically
    pub teams: (String, String),
    pub kickoff: KickoffKey,
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} vs {}", self.sport, self.teams.0, self.teams.1)
    }
}

pub fn game_key(prop: &Prop) -> GameKey {
    let team = prop.team.trim().to_string();
    let opponent = prop.opponent.trim().to_string();
    let teams = if team <= opponent {
        (team, opponent)
    } else {
        (opponent, team)
    };
    let kickoff = match prop.game_time.epoch_millis() {
        Some(ms) => KickoffKey::Millis(ms),
        None => KickoffKey::Unparsed(match &prop.game_time {
            GameTime::Text(s) => s.trim().to_string(),
            other => format!("{:?}", other),
        }),
    };
    GameKey {
        sport: prop.sport,
        teams,
        kickoff,
    }
}

// ── Warnings ─────────────────────────────────────────────────────────────────

/// Group props by key, keeping groups (and members) in first-seen order.
fn group_by<'a, K, F>(props: &'a [Prop], key_fn: F) -> Vec<(K, Vec<&'a Prop>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&Prop) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a Prop>)> = Vec::new();
    for prop in props {
        let key = key_fn(prop);
        match index.get(&key) {
            Some(&i) => groups[i].1.push(prop),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![prop]));
            }
        }
    }
    groups
}

fn ids(group: &[&Prop]) -> Vec<i64> {
    group.iter().map(|p| p.id).collect()
}

/// Scan a set of props for groups that are not statistically independent.
///
/// Same-game groups are flagged high, same-team medium, same-player high, and
/// mechanically related stats of one player medium. A same-team group whose
/// ids exactly match an already flagged same-game group is not repeated.
pub fn detect_correlations(props: &[Prop]) -> Vec<CorrelationWarning> {
    if props.len() < 2 {
        return Vec::new();
    }

    let mut warnings = Vec::new();
    let mut same_game_sets: Vec<BTreeSet<i64>> = Vec::new();

    for (key, group) in group_by(props, game_key) {
        if group.len() < 2 {
            continue;
        }
        same_game_sets.push(group.iter().map(|p| p.id).collect());
        warnings.push(CorrelationWarning {
            warning_type: WarningType::SameGame,
            severity: Severity::High,
            description: format!("{} props from the same game ({})", group.len(), key),
            prop_ids: ids(&group),
        });
    }

    for ((sport, team), group) in group_by(props, |p| (p.sport, p.team.trim().to_string())) {
        if group.len() < 2 {
            continue;
        }
        let id_set: BTreeSet<i64> = group.iter().map(|p| p.id).collect();
        if same_game_sets.contains(&id_set) {
            continue;
        }
        warnings.push(CorrelationWarning {
            warning_type: WarningType::SameTeam,
            severity: Severity::Medium,
            description: format!("{} props on {} ({})", group.len(), team, sport),
            prop_ids: ids(&group),
        });
    }

    for ((sport, _), group) in group_by(props, |p| (p.sport, normalize_name(&p.player))) {
        if group.len() < 2 {
            continue;
        }
        let player = group[0].player.trim();
        warnings.push(CorrelationWarning {
            warning_type: WarningType::SamePlayer,
            severity: Severity::High,
            description: format!("{} props on {} ({})", group.len(), player, sport),
            prop_ids: ids(&group),
        });

        let stats: Vec<String> = group.iter().map(|p| normalize_stat(&p.stat)).collect();
        for &(a, b) in related_stat_pairs(sport) {
            let has = |s: &str| stats.iter().any(|x| x == s);
            if !(has(a) && has(b)) {
                continue;
            }
            let prop_ids = group
                .iter()
                .zip(&stats)
                .filter(|(_, s)| s.as_str() == a || s.as_str() == b)
                .map(|(p, _)| p.id)
                .collect();
            warnings.push(CorrelationWarning {
                warning_type: WarningType::StatRelated,
                severity: Severity::Medium,
                description: format!("{}: {} and {} are mechanically related", player, a, b),
                prop_ids,
            });
        }
    }

    warnings
}

// ── Pairwise score ───────────────────────────────────────────────────────────

/// Additive dependence score between two props, capped at 1.0.
///
/// Same player adds 0.8, same game 0.6, teammates 0.3. Contributions stack,
/// so a player's two props in one game saturate at 1.0.
pub fn correlation_score(a: &Prop, b: &Prop) -> f64 {
    let same_sport = a.sport == b.sport;
    let same_player = same_sport && normalize_name(&a.player) == normalize_name(&b.player);

    let mut score = 0.0;
    if same_player {
        score += SAME_PLAYER_WEIGHT;
    }
    if game_key(a) == game_key(b) {
        score += SAME_GAME_WEIGHT;
    }
    if same_sport && !same_player && a.team.trim() == b.team.trim() {
        score += SAME_TEAM_WEIGHT;
    }
    score.min(1.0)
}

/// True when any already-chosen prop scores at or above `threshold` against
/// the candidate.
pub fn has_high_correlation(candidate: &Prop, existing: &[&Prop], threshold: f64) -> bool {
    existing
        .iter()
        .any(|p| correlation_score(candidate, p) >= threshold)
}
