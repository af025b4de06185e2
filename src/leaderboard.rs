//! Local leaderboard: best results first, earliest result wins a tie.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entries kept in storage.
pub const MAX_STORED: usize = 6;
/// Entries shown to the player.
pub const MAX_SHOWN: usize = 5;
/// Longest accepted player name, in characters.
pub const MAX_NAME_LEN: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    /// Milliseconds since the Unix epoch.
    pub ts: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

/// Keeps ASCII letters, digits, space, `_` and `-`, then cuts to 16 characters.
pub fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .take(MAX_NAME_LEN)
        .collect()
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse stored text. Anything that is not a JSON array yields an empty
    /// board, and array items without a string `name` and numeric `score` are
    /// skipped. Entries without a timestamp get `now_ms`.
    pub fn parse(raw: &str, now_ms: u64) -> Self {
        let items = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Array(items)) => items,
            Ok(_) => return Self::default(),
            Err(e) => {
                tracing::warn!("discarding malformed leaderboard: {e}");
                return Self::default();
            }
        };

        let entries = items
            .iter()
            .filter_map(|item| {
                let name = item.get("name")?.as_str()?;
                let score = item.get("score")?.as_f64()?;
                let ts = item.get("ts").and_then(Value::as_u64).filter(|&ts| ts > 0);
                Some(LeaderboardEntry {
                    name: name.to_string(),
                    score: score.max(0.0).min(f64::from(u32::MAX)) as u32,
                    ts: ts.unwrap_or(now_ms),
                })
            })
            .collect();

        let mut board = Leaderboard { entries };
        board.normalize();
        board
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    /// Add a finished round. Rounds without a name are not recorded.
    pub fn record(&mut self, name: &str, score: u32, ts: u64) -> bool {
        if name.is_empty() {
            return false;
        }
        self.entries.push(LeaderboardEntry {
            name: name.to_string(),
            score,
            ts,
        });
        self.normalize();
        true
    }

    fn normalize(&mut self) {
        self.entries
            .sort_by(|a, b| b.score.cmp(&a.score).then(a.ts.cmp(&b.ts)));
        self.entries.truncate(MAX_STORED);
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn top(&self) -> &[LeaderboardEntry] {
        &self.entries[..self.entries.len().min(MAX_SHOWN)]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
