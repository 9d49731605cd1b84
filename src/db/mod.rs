use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{Direction, Pick, Slip};

/// Thread-safe SQLite connection pool (single connection with mutex)
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Self::from_connection(conn)
    }

    /// Private in-memory database, used by tests and one-shot runs
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }

    /// Run schema migrations (idempotent)
    fn run_migrations(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ── Slips ─────────────────────────────────────────────────────────────────

    /// Store a slip and its picks; returns the new slip id
    pub fn insert_slip(&self, slip: &Slip, bankroll: f64) -> Result<i64> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO slips (
                title, slip_type, confidence, suggested_bet, potential_return,
                platform, warnings_count, bankroll, created_at
             ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
            params![
                slip.title,
                slip.slip_type,
                slip.confidence,
                slip.suggested_bet,
                slip.potential_return,
                slip.platform,
                slip.warnings_count as i64,
                bankroll,
                Utc::now(),
            ],
        )?;
        let slip_id = tx.last_insert_rowid();
        for (position, pick) in slip.picks.iter().enumerate() {
            tx.execute(
                "INSERT INTO slip_picks (
                    slip_id, position, prop_id, player, stat, line, direction, confidence
                 ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
                params![
                    slip_id,
                    position as i64,
                    pick.prop_id,
                    pick.player,
                    pick.stat,
                    pick.line,
                    direction_to_sql(pick.direction),
                    pick.confidence,
                ],
            )?;
        }
        tx.commit()?;
        Ok(slip_id)
    }

    /// List stored slips, newest first (paginated)
    pub fn list_slips(&self, limit: i64, offset: i64) -> Result<Vec<StoredSlip>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, slip_type, confidence, suggested_bet, potential_return,
                    platform, warnings_count, bankroll, created_at
             FROM slips ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
        )?;
        let mut slips = stmt
            .query_map(params![limit, offset], map_slip)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut picks_stmt = conn.prepare(
            "SELECT prop_id, player, stat, line, direction, confidence
             FROM slip_picks WHERE slip_id=?1 ORDER BY position",
        )?;
        for stored in &mut slips {
            stored.slip.picks = picks_stmt
                .query_map(params![stored.id], map_pick)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
        }
        Ok(slips)
    }

    // ── Stats ─────────────────────────────────────────────────────────────────

    /// Aggregate counts over stored slips
    pub fn get_stats(&self) -> Result<Stats> {
        let conn = self.lock()?;
        let (total_slips, total_suggested_bet): (i64, f64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(CAST(suggested_bet AS REAL)), 0.0) FROM slips",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;
        let mut stmt =
            conn.prepare("SELECT slip_type, COUNT(*) FROM slips GROUP BY slip_type")?;
        let slips_by_type = stmt
            .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;
        Ok(Stats {
            total_slips,
            total_suggested_bet,
            slips_by_type,
        })
    }
}

// ── SQL helpers ────────────────────────────────────────────────────────────────

fn direction_to_sql(direction: Direction) -> &'static str {
    match direction {
        Direction::Over => "over",
        Direction::Under => "under",
    }
}

fn direction_from_sql(idx: usize, raw: &str) -> rusqlite::Result<Direction> {
    match raw {
        "over" => Ok(Direction::Over),
        "under" => Ok(Direction::Under),
        other => Err(rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unknown direction '{}'", other).into(),
        )),
    }
}

fn map_slip(row: &rusqlite::Row) -> rusqlite::Result<StoredSlip> {
    Ok(StoredSlip {
        id: row.get(0)?,
        slip: Slip {
            title: row.get(1)?,
            slip_type: row.get(2)?,
            picks: Vec::new(),
            confidence: row.get(3)?,
            suggested_bet: row.get(4)?,
            potential_return: row.get(5)?,
            platform: row.get(6)?,
            warnings_count: row.get::<_, i64>(7)?.max(0) as usize,
        },
        bankroll: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn map_pick(row: &rusqlite::Row) -> rusqlite::Result<Pick> {
    let direction: String = row.get(4)?;
    Ok(Pick {
        prop_id: row.get(0)?,
        player: row.get(1)?,
        stat: row.get(2)?,
        line: row.get(3)?,
        direction: direction_from_sql(4, &direction)?,
        confidence: row.get(5)?,
    })
}

/// SQLite schema (idempotent CREATE IF NOT EXISTS)
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS slips (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    title            TEXT    NOT NULL,
    slip_type        TEXT    NOT NULL,
    confidence       INTEGER NOT NULL,
    suggested_bet    TEXT    NOT NULL,
    potential_return TEXT    NOT NULL,
    platform         TEXT    NOT NULL,
    warnings_count   INTEGER NOT NULL DEFAULT 0,
    bankroll         REAL    NOT NULL,
    created_at       TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS slip_picks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    slip_id     INTEGER NOT NULL,
    position    INTEGER NOT NULL,
    prop_id     INTEGER NOT NULL,
    player      TEXT    NOT NULL,
    stat        TEXT    NOT NULL,
    line        REAL    NOT NULL,
    direction   TEXT    NOT NULL,
    confidence  REAL    NOT NULL,
    FOREIGN KEY (slip_id) REFERENCES slips(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_slips_type ON slips(slip_type);
CREATE INDEX IF NOT EXISTS idx_slip_picks_slip ON slip_picks(slip_id);
"#;

/// A slip as persisted, with its storage metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSlip {
    pub id: i64,
    #[serde(flatten)]
    pub slip: Slip,
    pub bankroll: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_slips: i64,
    pub total_suggested_bet: f64,
    pub slips_by_type: BTreeMap<String, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn slip(slip_type: &str, bet: &str) -> Slip {
        Slip {
            title: format!("{} 2-Leg Parlay", slip_type),
            slip_type: slip_type.into(),
            picks: vec![
                Pick {
                    prop_id: 1,
                    player: "Luka Doncic".into(),
                    stat: "Pts".into(),
                    line: 32.5,
                    direction: Direction::Over,
                    confidence: 74.0,
                },
                Pick {
                    prop_id: 9,
                    player: "Connor McDavid".into(),
                    stat: "SOG".into(),
                    line: 3.5,
                    direction: Direction::Under,
                    confidence: 66.0,
                },
            ],
            confidence: 70,
            suggested_bet: bet.into(),
            potential_return: "36.48".into(),
            platform: "Multiple".into(),
            warnings_count: 0,
        }
    }

    #[test]
    fn test_insert_and_list_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let original = slip("conservative", "10.00");
        let id = db.insert_slip(&original, 100.0).unwrap();

        let stored = db.list_slips(10, 0).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].slip, original);
        assert_relative_eq!(stored[0].bankroll, 100.0);
    }

    #[test]
    fn test_list_is_newest_first_and_paginated() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_slip(&slip("conservative", "10.00"), 100.0).unwrap();
        let second = db.insert_slip(&slip("balanced", "7.50"), 100.0).unwrap();

        let page = db.list_slips(1, 0).unwrap();
        assert_eq!(page[0].id, second);
        let page = db.list_slips(1, 1).unwrap();
        assert_eq!(page[0].id, first);
    }

    #[test]
    fn test_stats() {
        let db = Database::open_in_memory().unwrap();
        db.insert_slip(&slip("conservative", "10.00"), 100.0).unwrap();
        db.insert_slip(&slip("conservative", "5.00"), 100.0).unwrap();
        db.insert_slip(&slip("custom", "7.25"), 100.0).unwrap();

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.total_slips, 3);
        assert_relative_eq!(stats.total_suggested_bet, 22.25, epsilon = 1e-9);
        assert_eq!(stats.slips_by_type.get("conservative"), Some(&2));
        assert_eq!(stats.slips_by_type.get("custom"), Some(&1));
    }

    #[test]
    fn test_empty_stats() {
        let db = Database::open_in_memory().unwrap();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.total_slips, 0);
        assert!(stats.slips_by_type.is_empty());
    }
}
