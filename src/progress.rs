//! Per-user progress persistence.
//!
//! Two tables: `levels` holds the mastery level of each number a user has
//! answered (the sampling weight input), `games` holds one row per session
//! with its final error count. Level arithmetic: a correct first-try answer
//! bumps the level by one up to MAX_LEVEL; any wrong answer halves it down
//! to MIN_LEVEL. Numbers never seen sit at INITIAL_LEVEL.

use crate::app_dirs::AppDirs;
use crate::session::{LevelMap, SessionConfig};
use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension, Result};
use std::path::{Path, PathBuf};

pub const INITIAL_LEVEL: u32 = 1;
pub const MIN_LEVEL: u32 = 0;
pub const MAX_LEVEL: u32 = 10;

/// Database manager for mastery levels and game records
#[derive(Debug)]
pub struct ProgressDb {
    conn: Connection,
}

impl ProgressDb {
    /// Open the database at the default state path, creating tables if needed
    pub fn new() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("faktor_progress.db"));

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        Self::open(&db_path)
    }

    /// Open the database at an explicit path (used by tests)
    pub fn with_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path.as_ref())
    }

    fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS levels (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user TEXT NOT NULL,
                number INTEGER NOT NULL,
                level INTEGER NOT NULL,
                UNIQUE(user, number)
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user TEXT NOT NULL,
                max_num INTEGER NOT NULL,
                num_groups INTEGER NOT NULL,
                group_num INTEGER NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                error_count INTEGER
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_levels_user ON levels(user)",
            [],
        )?;

        Ok(ProgressDb { conn })
    }

    /// Level map covering every integer in [1, max_num]; numbers without a
    /// stored row default to INITIAL_LEVEL.
    pub fn level_map(&self, user: &str, max_num: u32) -> Result<LevelMap> {
        let mut stmt = self
            .conn
            .prepare("SELECT number, level FROM levels WHERE user = ?1 AND number <= ?2")?;

        let mut map: LevelMap = stmt
            .query_map(params![user, max_num], |row| {
                Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?))
            })?
            .collect::<Result<_>>()?;

        for number in 1..=max_num {
            map.entry(number).or_insert(INITIAL_LEVEL);
        }
        Ok(map)
    }

    /// Stored level for one number, if any row exists.
    pub fn level_of(&self, user: &str, number: u32) -> Result<Option<u32>> {
        self.conn
            .query_row(
                "SELECT level FROM levels WHERE user = ?1 AND number = ?2",
                params![user, number],
                |row| row.get(0),
            )
            .optional()
    }

    /// "Up" signal: first-try correct answer. Bumps the level by one,
    /// capped at MAX_LEVEL.
    pub fn record_correct(&self, user: &str, number: u32) -> Result<()> {
        match self.level_of(user, number)? {
            None => {
                self.conn.execute(
                    "INSERT INTO levels (user, number, level) VALUES (?1, ?2, ?3)",
                    params![user, number, INITIAL_LEVEL + 1],
                )?;
            }
            Some(level) if level < MAX_LEVEL => {
                self.conn.execute(
                    "UPDATE levels SET level = level + 1 WHERE user = ?1 AND number = ?2",
                    params![user, number],
                )?;
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// "Down" signal: wrong answer. Halves the level (integer division),
    /// never dropping below MIN_LEVEL.
    pub fn record_incorrect(&self, user: &str, number: u32) -> Result<()> {
        match self.level_of(user, number)? {
            None => {
                self.conn.execute(
                    "INSERT INTO levels (user, number, level) VALUES (?1, ?2, ?3)",
                    params![user, number, INITIAL_LEVEL.saturating_sub(1).max(MIN_LEVEL)],
                )?;
            }
            Some(level) if level > MIN_LEVEL => {
                self.conn.execute(
                    "UPDATE levels SET level = ?3 WHERE user = ?1 AND number = ?2",
                    params![user, number, level / 2],
                )?;
            }
            Some(_) => {}
        }
        Ok(())
    }

    /// Delete all level rows for a user. Returns the number removed.
    pub fn clear(&self, user: &str) -> Result<usize> {
        self.conn
            .execute("DELETE FROM levels WHERE user = ?1", params![user])
    }

    /// Record the start of a game and return its row id.
    pub fn start_game(&self, user: &str, config: &SessionConfig) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO games (user, max_num, num_groups, group_num, start_time)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                user,
                config.max_num,
                config.num_groups,
                config.group_num,
                Local::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// "Session finished" signal: stamp the end time and total error count.
    pub fn finish_game(&self, game_id: i64, error_count: u32) -> Result<()> {
        self.conn.execute(
            "UPDATE games SET end_time = ?2, error_count = ?3 WHERE id = ?1",
            params![game_id, Local::now().to_rfc3339(), error_count],
        )?;
        Ok(())
    }

    /// How many numbers sit at each level above INITIAL_LEVEL, for the
    /// landing screen summary. Ascending by level; levels with no numbers
    /// are omitted.
    pub fn level_counts(&self, user: &str) -> Result<Vec<(u32, u32)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT level, COUNT(*) FROM levels
            WHERE user = ?1 AND level > ?2 AND level <= ?3
            GROUP BY level
            ORDER BY level
            "#,
        )?;

        let counts = stmt
            .query_map(params![user, INITIAL_LEVEL, MAX_LEVEL], |row| {
                Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?))
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn temp_db() -> (tempfile::TempDir, ProgressDb) {
        let dir = tempdir().unwrap();
        let db = ProgressDb::with_path(dir.path().join("progress.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn first_correct_answer_starts_above_initial() {
        let (_dir, db) = temp_db();
        db.record_correct("ada", 12).unwrap();
        assert_eq!(db.level_of("ada", 12).unwrap(), Some(INITIAL_LEVEL + 1));
    }

    #[test]
    fn correct_answers_cap_at_max_level() {
        let (_dir, db) = temp_db();
        for _ in 0..20 {
            db.record_correct("ada", 7).unwrap();
        }
        assert_eq!(db.level_of("ada", 7).unwrap(), Some(MAX_LEVEL));
    }

    #[test]
    fn first_incorrect_answer_floors_at_min_level() {
        let (_dir, db) = temp_db();
        db.record_incorrect("ada", 9).unwrap();
        assert_eq!(db.level_of("ada", 9).unwrap(), Some(MIN_LEVEL));

        db.record_incorrect("ada", 9).unwrap();
        assert_eq!(db.level_of("ada", 9).unwrap(), Some(MIN_LEVEL));
    }

    #[test]
    fn incorrect_answers_halve_the_level() {
        let (_dir, db) = temp_db();
        for _ in 0..7 {
            db.record_correct("ada", 30).unwrap();
        }
        assert_eq!(db.level_of("ada", 30).unwrap(), Some(8));

        db.record_incorrect("ada", 30).unwrap();
        assert_eq!(db.level_of("ada", 30).unwrap(), Some(4));

        db.record_incorrect("ada", 30).unwrap();
        assert_eq!(db.level_of("ada", 30).unwrap(), Some(2));

        // 1 / 2 == 0, integer division
        db.record_incorrect("ada", 30).unwrap();
        db.record_incorrect("ada", 30).unwrap();
        assert_eq!(db.level_of("ada", 30).unwrap(), Some(MIN_LEVEL));
    }

    #[test]
    fn level_map_fills_defaults_for_unseen_numbers() {
        let (_dir, db) = temp_db();
        db.record_correct("ada", 3).unwrap();
        db.record_incorrect("ada", 5).unwrap();

        let map = db.level_map("ada", 10).unwrap();
        assert_eq!(map.len(), 10);
        assert_eq!(map[&3], INITIAL_LEVEL + 1);
        assert_eq!(map[&5], MIN_LEVEL);
        assert_eq!(map[&1], INITIAL_LEVEL);
        assert_eq!(map[&10], INITIAL_LEVEL);
    }

    #[test]
    fn level_map_excludes_numbers_above_the_bound() {
        let (_dir, db) = temp_db();
        db.record_correct("ada", 50).unwrap();

        let map = db.level_map("ada", 10).unwrap();
        assert_eq!(map.len(), 10);
        assert!(!map.contains_key(&50));
    }

    #[test]
    fn levels_are_per_user() {
        let (_dir, db) = temp_db();
        db.record_correct("ada", 4).unwrap();
        assert_eq!(db.level_of("grace", 4).unwrap(), None);
    }

    #[test]
    fn clear_removes_only_the_given_user() {
        let (_dir, db) = temp_db();
        db.record_correct("ada", 4).unwrap();
        db.record_correct("ada", 6).unwrap();
        db.record_correct("grace", 4).unwrap();

        assert_eq!(db.clear("ada").unwrap(), 2);
        assert_eq!(db.level_of("ada", 4).unwrap(), None);
        assert_eq!(db.level_of("grace", 4).unwrap(), Some(INITIAL_LEVEL + 1));
    }

    #[test]
    fn game_lifecycle_round_trips() {
        let (_dir, db) = temp_db();
        let config = SessionConfig {
            max_num: 20,
            num_groups: 2,
            group_num: 0,
            ignore_levels: true,
        };
        let game_id = db.start_game("ada", &config).unwrap();
        db.finish_game(game_id, 3).unwrap();

        let (end_time, error_count): (Option<String>, Option<u32>) = db
            .conn
            .query_row(
                "SELECT end_time, error_count FROM games WHERE id = ?1",
                params![game_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!(end_time.is_some());
        assert_eq!(error_count, Some(3));
    }

    #[test]
    fn level_counts_summarize_above_initial() {
        let (_dir, db) = temp_db();
        // two numbers at level 2, one at 3, one parked at MIN_LEVEL
        db.record_correct("ada", 2).unwrap();
        db.record_correct("ada", 4).unwrap();
        db.record_correct("ada", 6).unwrap();
        db.record_correct("ada", 6).unwrap();
        db.record_incorrect("ada", 8).unwrap();

        assert_eq!(db.level_counts("ada").unwrap(), vec![(2, 2), (3, 1)]);
    }
}
