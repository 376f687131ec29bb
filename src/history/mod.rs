//! SQLite-backed history of prompt conversions
//!
//! Each successful conversion is stored once per distinct prompt; converting
//! the same prompt again bumps its usage counter. Failed conversions are
//! stored as their own rows with the error message. Rows can be rated and
//! annotated with feedback, overall and per record section, and the store
//! reports simple usage analytics.

mod types;

pub use types::*;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use sha2::{Digest, Sha256};
use ulid::Ulid;

use crate::core::record::IstvonRecord;

/// Current schema version, recorded on creation
const SCHEMA_VERSION: i32 = 2;

/// How many entries `stats()` keeps in its top lists
const TOP_N: usize = 5;

const COLUMNS: &str = "id, original_prompt, prompt_hash, record, success, error_message, \
     validation_passed, rating, feedback, times_used, created_at, updated_at, last_used";

/// Conversion history backed by SQLite
pub struct ConversionStore {
    conn: Connection,
}

impl ConversionStore {
    /// Open or create the history database at `path`
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| HistoryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self { conn };
        store.init_schema()?;
        tracing::debug!(path = %path.display(), "opened history store");
        Ok(store)
    }

    /// A throwaway store, used by tests and `--no-save` style flows
    pub fn open_in_memory() -> Result<Self, HistoryError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), HistoryError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS conversions (
                id TEXT PRIMARY KEY,
                original_prompt TEXT NOT NULL,
                prompt_hash TEXT NOT NULL,
                record TEXT,
                success INTEGER NOT NULL,
                error_message TEXT,
                validation_passed INTEGER NOT NULL DEFAULT 0,
                rating INTEGER,
                feedback TEXT,
                times_used INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                last_used TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_conversions_hash ON conversions(prompt_hash);
            CREATE INDEX IF NOT EXISTS idx_conversions_created ON conversions(created_at);

            CREATE TABLE IF NOT EXISTS conversion_feedback (
                conversion_id TEXT PRIMARY KEY REFERENCES conversions(id) ON DELETE CASCADE,
                instructions_quality INTEGER,
                source_data_accuracy INTEGER,
                tools_appropriateness INTEGER,
                variables_completeness INTEGER,
                outcome_specification INTEGER,
                notification_relevance INTEGER,
                suggested_improvements TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    /// Store a successful conversion, or bump the usage of an identical one
    pub fn record_success(
        &self,
        prompt: &str,
        record: &IstvonRecord,
        validation_passed: bool,
    ) -> Result<Conversion, HistoryError> {
        let hash = prompt_hash(prompt);
        let now = timestamp(Utc::now());

        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM conversions WHERE prompt_hash = ?1 AND success = 1 \
                 ORDER BY rowid DESC LIMIT 1",
                params![hash],
                |row| row.get(0),
            )
            .optional()?;

        let record_json = serde_json::to_string(record)?;

        if let Some(id) = existing {
            // The schema may have changed since the row was stored
            self.conn.execute(
                "UPDATE conversions SET times_used = times_used + 1, record = ?2, validation_passed = ?3, \
                 last_used = ?4, updated_at = ?4 WHERE id = ?1",
                params![id, record_json, validation_passed, now],
            )?;
            tracing::debug!(id = %id, "reused stored conversion");
            return self.get(&id);
        }

        let id = Ulid::new().to_string();
        self.conn.execute(
            "INSERT INTO conversions (id, original_prompt, prompt_hash, record, success, \
             validation_passed, times_used, created_at, updated_at, last_used) \
             VALUES (?1, ?2, ?3, ?4, 1, ?5, 1, ?6, ?6, ?6)",
            params![id, prompt, hash, record_json, validation_passed, now],
        )?;
        tracing::debug!(id = %id, "stored conversion");
        self.get(&id)
    }

    /// Store a failed conversion
    pub fn record_failure(&self, prompt: &str, error: &str) -> Result<Conversion, HistoryError> {
        let id = Ulid::new().to_string();
        let now = timestamp(Utc::now());
        self.conn.execute(
            "INSERT INTO conversions (id, original_prompt, prompt_hash, success, error_message, \
             validation_passed, times_used, created_at, updated_at) \
             VALUES (?1, ?2, ?3, 0, ?4, 0, 1, ?5, ?5)",
            params![id, prompt, prompt_hash(prompt), error, now],
        )?;
        tracing::debug!(id = %id, "stored failed conversion");
        self.get(&id)
    }

    /// Look up a conversion by full id or unique id prefix
    pub fn get(&self, id: &str) -> Result<Conversion, HistoryError> {
        let id = id.trim().to_uppercase();

        let exact = self
            .conn
            .query_row(
                &format!("SELECT {} FROM conversions WHERE id = ?1", COLUMNS),
                params![id],
                row_to_conversion,
            )
            .optional()?;
        if let Some(conversion) = exact {
            return Ok(conversion);
        }

        if id.is_empty() {
            return Err(HistoryError::NotFound(id));
        }

        // Literal prefix match; LIKE would treat `%` and `_` as wildcards
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM conversions WHERE substr(id, 1, length(?1)) = ?1 LIMIT 2",
            COLUMNS
        ))?;
        let mut matches = stmt
            .query_map(params![id], row_to_conversion)?
            .collect::<Result<Vec<_>, _>>()?;

        match matches.len() {
            0 => Err(HistoryError::NotFound(id)),
            1 => Ok(matches.remove(0)),
            _ => Err(HistoryError::Ambiguous(id)),
        }
    }

    /// Most recent conversion of exactly this prompt, preferring successes
    pub fn find_by_prompt(&self, prompt: &str) -> Result<Option<Conversion>, HistoryError> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM conversions WHERE prompt_hash = ?1 \
                     ORDER BY success DESC, rowid DESC LIMIT 1",
                    COLUMNS
                ),
                params![prompt_hash(prompt)],
                row_to_conversion,
            )
            .optional()?)
    }

    /// Newest conversions first
    pub fn recent(&self, limit: usize, include_failed: bool) -> Result<Vec<Conversion>, HistoryError> {
        let filter = if include_failed { "" } else { "WHERE success = 1" };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM conversions {} ORDER BY created_at DESC, rowid DESC LIMIT ?1",
            COLUMNS, filter
        ))?;
        let rows = stmt
            .query_map(params![limit as i64], row_to_conversion)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Rate a conversion from 1 to 5, optionally with feedback
    pub fn rate(&self, id: &str, rating: u8, feedback: Option<&str>) -> Result<Conversion, HistoryError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(HistoryError::InvalidRating(rating));
        }

        let conversion = self.get(id)?;
        let feedback = feedback.filter(|f| !f.is_empty()).or(conversion.feedback.as_deref());
        self.conn.execute(
            "UPDATE conversions SET rating = ?2, feedback = ?3, updated_at = ?4 WHERE id = ?1",
            params![conversion.id, rating, feedback, timestamp(Utc::now())],
        )?;
        tracing::debug!(id = %conversion.id, rating, "rated conversion");
        self.get(&conversion.id)
    }

    /// Merge per-section ratings and improvement notes into a conversion's feedback
    ///
    /// Sections not mentioned in `feedback` keep their earlier values. Returns
    /// the feedback now stored for the conversion.
    pub fn give_feedback(&self, id: &str, feedback: &ComponentFeedback) -> Result<ComponentFeedback, HistoryError> {
        feedback.check()?;
        let conversion = self.get(id)?;

        let mut merged = self.load_feedback(&conversion.id)?.unwrap_or_default();
        merged.merge(feedback);

        let notes: BTreeMap<&str, &str> = merged
            .suggested_improvements
            .iter()
            .map(|(component, text)| (component.as_str(), text.as_str()))
            .collect();
        let rating = |component: FeedbackComponent| merged.ratings.get(&component).copied();
        let now = timestamp(Utc::now());

        self.conn.execute(
            "INSERT INTO conversion_feedback (conversion_id, instructions_quality, source_data_accuracy, \
             tools_appropriateness, variables_completeness, outcome_specification, notification_relevance, \
             suggested_improvements, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9) \
             ON CONFLICT(conversion_id) DO UPDATE SET \
             instructions_quality = excluded.instructions_quality, \
             source_data_accuracy = excluded.source_data_accuracy, \
             tools_appropriateness = excluded.tools_appropriateness, \
             variables_completeness = excluded.variables_completeness, \
             outcome_specification = excluded.outcome_specification, \
             notification_relevance = excluded.notification_relevance, \
             suggested_improvements = excluded.suggested_improvements, \
             updated_at = excluded.updated_at",
            params![
                conversion.id,
                rating(FeedbackComponent::Instructions),
                rating(FeedbackComponent::SourceData),
                rating(FeedbackComponent::Tools),
                rating(FeedbackComponent::Variables),
                rating(FeedbackComponent::Outcome),
                rating(FeedbackComponent::Notification),
                serde_json::to_string(&notes)?,
                now,
            ],
        )?;
        tracing::debug!(id = %conversion.id, sections = merged.ratings.len(), "stored section feedback");
        Ok(merged)
    }

    /// Per-section feedback recorded for a conversion, if any
    pub fn component_feedback(&self, id: &str) -> Result<Option<ComponentFeedback>, HistoryError> {
        let conversion = self.get(id)?;
        self.load_feedback(&conversion.id)
    }

    fn load_feedback(&self, id: &str) -> Result<Option<ComponentFeedback>, HistoryError> {
        let columns: Vec<&str> = FeedbackComponent::ALL.iter().map(|c| c.column()).collect();
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {}, suggested_improvements FROM conversion_feedback WHERE conversion_id = ?1",
                    columns.join(", ")
                ),
                params![id],
                |row| {
                    let mut ratings = BTreeMap::new();
                    for (i, component) in FeedbackComponent::ALL.into_iter().enumerate() {
                        if let Some(rating) = row.get::<_, Option<u8>>(i)? {
                            ratings.insert(component, rating);
                        }
                    }
                    let notes: String = row.get(FeedbackComponent::ALL.len())?;
                    Ok((ratings, notes))
                },
            )
            .optional()?;

        let Some((ratings, notes)) = row else {
            return Ok(None);
        };
        let notes: BTreeMap<String, String> = serde_json::from_str(&notes)?;
        let suggested_improvements = notes
            .into_iter()
            .filter_map(|(key, text)| key.parse::<FeedbackComponent>().ok().map(|c| (c, text)))
            .collect();

        Ok(Some(ComponentFeedback {
            ratings,
            suggested_improvements,
        }))
    }

    /// Usage analytics over every stored conversion
    pub fn stats(&self) -> Result<HistoryStats, HistoryError> {
        let (total, successful, average_rating): (i64, i64, Option<f64>) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(success), 0), AVG(rating) FROM conversions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let mut tools: HashMap<String, u64> = HashMap::new();
        let mut formats: HashMap<String, u64> = HashMap::new();
        let mut topics: HashMap<String, u64> = HashMap::new();
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM conversions WHERE success = 1", COLUMNS))?;
        for conversion in stmt.query_map([], row_to_conversion)? {
            let conversion = conversion?;
            for tool in conversion.tool_names() {
                *tools.entry(tool.to_string()).or_default() += 1;
            }
            if let Some(format) = conversion.output_format() {
                *formats.entry(format.to_string()).or_default() += 1;
            }
            if let Some(topic) = conversion.topic() {
                *topics.entry(topic.to_string()).or_default() += 1;
            }
        }

        Ok(HistoryStats {
            total: total as u64,
            successful: successful as u64,
            failed: (total - successful) as u64,
            average_rating,
            top_tools: top_counts(tools),
            top_formats: top_counts(formats),
            top_topics: top_counts(topics),
        })
    }
}

/// Compute SHA256 hash of a prompt
fn prompt_hash(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Fixed-width RFC 3339 so text ordering matches time ordering
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

fn top_counts(counts: HashMap<String, u64>) -> Vec<(String, u64)> {
    let mut sorted: Vec<(String, u64)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(TOP_N);
    sorted
}

fn row_to_conversion(row: &Row<'_>) -> rusqlite::Result<Conversion> {
    let record = row
        .get::<_, Option<String>>(3)?
        .map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(Conversion {
        id: row.get(0)?,
        original_prompt: row.get(1)?,
        prompt_hash: row.get(2)?,
        record,
        success: row.get(4)?,
        error_message: row.get(5)?,
        validation_passed: row.get(6)?,
        rating: row.get(7)?,
        feedback: row.get(8)?,
        times_used: row.get(9)?,
        created_at: parse_datetime(&row.get::<_, String>(10)?),
        updated_at: parse_datetime(&row.get::<_, String>(11)?),
        last_used: row.get::<_, Option<String>>(12)?.as_deref().map(parse_datetime),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::ToolDescriptor;

    fn record(tools: &[&str], format: &str) -> IstvonRecord {
        let mut record = IstvonRecord::minimal("Write something");
        record.tools = tools.iter().map(|t| ToolDescriptor::new(*t)).collect();
        record.outcome.format = format.to_string();
        record
    }

    fn with_topic(mut record: IstvonRecord, topic: &str) -> IstvonRecord {
        record.variables.set("topic", topic);
        record
    }

    #[test]
    fn test_record_and_get() {
        let store = ConversionStore::open_in_memory().unwrap();
        let stored = store.record_success("Write a poem", &record(&["text_generation"], "plain_text"), true).unwrap();
        assert!(stored.success);
        assert_eq!(stored.times_used, 1);
        assert_eq!(stored.prompt_hash.len(), 64);
        assert_eq!(stored.tool_names(), ["text_generation"]);

        let fetched = store.get(&stored.id).unwrap();
        assert_eq!(fetched, stored);
    }

    #[test]
    fn test_repeated_prompt_increments_usage() {
        let store = ConversionStore::open_in_memory().unwrap();
        let r = record(&["text_generation"], "plain_text");
        let first = store.record_success("Write a poem", &r, true).unwrap();
        let second = store.record_success("Write a poem", &r, true).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.times_used, 2);
        assert!(second.last_used.is_some());
        assert_eq!(store.recent(10, true).unwrap().len(), 1);
    }

    #[test]
    fn test_failure_does_not_dedupe() {
        let store = ConversionStore::open_in_memory().unwrap();
        store.record_failure("broken", "Validation error at : boom").unwrap();
        let failed = store.record_failure("broken", "Validation error at : boom").unwrap();
        assert!(!failed.success);
        assert!(failed.record.is_none());
        assert_eq!(failed.error_message.as_deref(), Some("Validation error at : boom"));
        assert_eq!(store.recent(10, true).unwrap().len(), 2);
        assert!(store.recent(10, false).unwrap().is_empty());
    }

    #[test]
    fn test_recent_newest_first() {
        let store = ConversionStore::open_in_memory().unwrap();
        let r = record(&["text_generation"], "plain_text");
        store.record_success("one", &r, true).unwrap();
        store.record_success("two", &r, true).unwrap();
        store.record_success("three", &r, true).unwrap();
        let prompts: Vec<String> = store
            .recent(2, false)
            .unwrap()
            .into_iter()
            .map(|c| c.original_prompt)
            .collect();
        assert_eq!(prompts, ["three", "two"]);
    }

    #[test]
    fn test_find_by_prompt() {
        let store = ConversionStore::open_in_memory().unwrap();
        assert!(store.find_by_prompt("missing").unwrap().is_none());
        store.record_failure("Write", "bad").unwrap();
        store.record_success("Write", &record(&["text_generation"], "plain_text"), true).unwrap();
        let found = store.find_by_prompt("Write").unwrap().unwrap();
        assert!(found.success);
    }

    #[test]
    fn test_rate_bounds() {
        let store = ConversionStore::open_in_memory().unwrap();
        let stored = store.record_success("p", &record(&["text_generation"], "pdf"), true).unwrap();

        assert!(matches!(store.rate(&stored.id, 0, None), Err(HistoryError::InvalidRating(0))));
        assert!(matches!(store.rate(&stored.id, 6, None), Err(HistoryError::InvalidRating(6))));

        let rated = store.rate(&stored.id, 4, Some("useful")).unwrap();
        assert_eq!(rated.rating, Some(4));
        assert_eq!(rated.feedback.as_deref(), Some("useful"));

        let rerated = store.rate(&stored.id, 5, None).unwrap();
        assert_eq!(rerated.rating, Some(5));
        assert_eq!(rerated.feedback.as_deref(), Some("useful"));
    }

    #[test]
    fn test_rate_unknown_id() {
        let store = ConversionStore::open_in_memory().unwrap();
        assert!(matches!(store.rate("01ZZZZ", 3, None), Err(HistoryError::NotFound(_))));
    }

    #[test]
    fn test_get_by_prefix() {
        let store = ConversionStore::open_in_memory().unwrap();
        let stored = store.record_success("p", &record(&["text_generation"], "pdf"), true).unwrap();
        let found = store.get(&stored.id[..20].to_lowercase()).unwrap();
        assert_eq!(found.id, stored.id);
    }

    #[test]
    fn test_get_prefix_is_literal() {
        let store = ConversionStore::open_in_memory().unwrap();
        store.record_success("p", &record(&["text_generation"], "pdf"), true).unwrap();

        assert!(matches!(store.get("%"), Err(HistoryError::NotFound(_))));
        assert!(matches!(store.get("_"), Err(HistoryError::NotFound(_))));
        assert!(matches!(store.get("0%"), Err(HistoryError::NotFound(_))));
        assert!(matches!(store.rate("%", 1, None), Err(HistoryError::NotFound(_))));
    }

    #[test]
    fn test_reuse_refreshes_record() {
        let store = ConversionStore::open_in_memory().unwrap();
        let first = store.record_success("p", &record(&["text_generation"], "pdf"), false).unwrap();
        assert!(!first.validation_passed);

        let again = store.record_success("p", &record(&["summarization"], "markdown"), true).unwrap();
        assert_eq!(again.id, first.id);
        assert!(again.validation_passed);
        assert_eq!(again.tool_names(), ["summarization"]);
        assert_eq!(again.output_format(), Some("markdown"));
    }

    #[test]
    fn test_component_feedback_roundtrip() {
        let store = ConversionStore::open_in_memory().unwrap();
        let stored = store.record_success("p", &record(&["text_generation"], "pdf"), true).unwrap();
        assert_eq!(store.component_feedback(&stored.id).unwrap(), None);

        let mut fb = ComponentFeedback::default();
        fb.ratings.insert(FeedbackComponent::Instructions, 4);
        fb.ratings.insert(FeedbackComponent::Tools, 2);
        fb.suggested_improvements
            .insert(FeedbackComponent::Tools, "should include web_search".to_string());
        store.give_feedback(&stored.id, &fb).unwrap();

        let mut update = ComponentFeedback::default();
        update.ratings.insert(FeedbackComponent::Tools, 3);
        let merged = store.give_feedback(&stored.id[..12], &update).unwrap();

        let loaded = store.component_feedback(&stored.id).unwrap().unwrap();
        assert_eq!(loaded, merged);
        assert_eq!(loaded.ratings[&FeedbackComponent::Instructions], 4);
        assert_eq!(loaded.ratings[&FeedbackComponent::Tools], 3);
        assert!(!loaded.ratings.contains_key(&FeedbackComponent::Outcome));
        assert_eq!(
            loaded.suggested_improvements[&FeedbackComponent::Tools],
            "should include web_search"
        );
    }

    #[test]
    fn test_component_feedback_rejects_bad_rating() {
        let store = ConversionStore::open_in_memory().unwrap();
        let stored = store.record_success("p", &record(&["text_generation"], "pdf"), true).unwrap();

        let mut fb = ComponentFeedback::default();
        fb.ratings.insert(FeedbackComponent::Instructions, 5);
        fb.ratings.insert(FeedbackComponent::Notification, 6);
        assert!(matches!(
            store.give_feedback(&stored.id, &fb),
            Err(HistoryError::InvalidComponentRating { rating: 6, .. })
        ));
        assert_eq!(store.component_feedback(&stored.id).unwrap(), None);

        assert!(matches!(
            store.give_feedback("01ZZZZ", &ComponentFeedback::default()),
            Err(HistoryError::NotFound(_))
        ));
    }

    #[test]
    fn test_stats() {
        let store = ConversionStore::open_in_memory().unwrap();
        let a = store
            .record_success("a", &record(&["web_search", "summarization"], "pdf"), true)
            .unwrap();
        store
            .record_success("b", &with_topic(record(&["summarization"], "markdown"), "rust"), true)
            .unwrap();
        store
            .record_success("c", &with_topic(record(&["summarization"], "pdf"), "rust"), true)
            .unwrap();
        store
            .record_success("e", &with_topic(record(&["summarization"], "pdf"), "go"), true)
            .unwrap();
        store.record_failure("d", "nope").unwrap();
        store.rate(&a.id, 2, None).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.successful, 4);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.average_rating, Some(2.0));
        assert_eq!(
            stats.top_tools,
            [("summarization".to_string(), 4), ("web_search".to_string(), 1)]
        );
        assert_eq!(stats.top_formats[0], ("pdf".to_string(), 3));
        assert_eq!(
            stats.top_topics,
            [("rust".to_string(), 2), ("go".to_string(), 1)]
        );
    }

    #[test]
    fn test_empty_stats() {
        let store = ConversionStore::open_in_memory().unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats, HistoryStats::default());
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.db");
        let store = ConversionStore::open(&path).unwrap();
        store.record_failure("x", "y").unwrap();
        drop(store);

        let reopened = ConversionStore::open(&path).unwrap();
        assert_eq!(reopened.stats().unwrap().total, 1);
    }
}
