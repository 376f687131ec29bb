//! Types stored in and returned by the conversion history

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Accepted rating range
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Error, Diagnostic)]
pub enum HistoryError {
    #[error("History database error: {0}")]
    #[diagnostic(code(istvon::history::database))]
    Database(#[from] rusqlite::Error),

    #[error("Failed to create history directory {path}: {source}")]
    #[diagnostic(code(istvon::history::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize record: {0}")]
    #[diagnostic(code(istvon::history::serialize))]
    Serialize(#[from] serde_json::Error),

    #[error("Rating must be between 1 and 5, got {0}")]
    #[diagnostic(code(istvon::history::invalid_rating))]
    InvalidRating(u8),

    #[error("No conversion found with id: {0}")]
    #[diagnostic(
        code(istvon::history::not_found),
        help("Run `istvon history list --all` to see stored conversions")
    )]
    NotFound(String),

    #[error("Conversion id prefix '{0}' is ambiguous")]
    #[diagnostic(code(istvon::history::ambiguous), help("Use more characters of the id"))]
    Ambiguous(String),

    #[error("Rating for {component} must be between 1 and 5, got {rating}")]
    #[diagnostic(code(istvon::history::invalid_component_rating))]
    InvalidComponentRating { component: FeedbackComponent, rating: u8 },
}

/// One of the six record sections a conversion can be rated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackComponent {
    Instructions,
    SourceData,
    Tools,
    Variables,
    Outcome,
    Notification,
}

impl FeedbackComponent {
    pub const ALL: [FeedbackComponent; 6] = [
        FeedbackComponent::Instructions,
        FeedbackComponent::SourceData,
        FeedbackComponent::Tools,
        FeedbackComponent::Variables,
        FeedbackComponent::Outcome,
        FeedbackComponent::Notification,
    ];

    /// Record key this component rates
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackComponent::Instructions => "instructions",
            FeedbackComponent::SourceData => "source_data",
            FeedbackComponent::Tools => "tools",
            FeedbackComponent::Variables => "variables",
            FeedbackComponent::Outcome => "outcome",
            FeedbackComponent::Notification => "notification",
        }
    }

    /// Column holding this component's rating
    pub fn column(&self) -> &'static str {
        match self {
            FeedbackComponent::Instructions => "instructions_quality",
            FeedbackComponent::SourceData => "source_data_accuracy",
            FeedbackComponent::Tools => "tools_appropriateness",
            FeedbackComponent::Variables => "variables_completeness",
            FeedbackComponent::Outcome => "outcome_specification",
            FeedbackComponent::Notification => "notification_relevance",
        }
    }
}

impl fmt::Display for FeedbackComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackComponent {
    type Err = String;

    /// Accepts the record key (`source_data`) or the column name (`source_data_accuracy`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s || c.column() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|c| c.as_str()).collect();
                format!("unknown component '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// Per-component ratings and improvement notes for one conversion
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComponentFeedback {
    pub ratings: BTreeMap<FeedbackComponent, u8>,
    pub suggested_improvements: BTreeMap<FeedbackComponent, String>,
}

impl ComponentFeedback {
    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty() && self.suggested_improvements.is_empty()
    }

    /// Every rating must lie in 1..=5
    pub fn check(&self) -> Result<(), HistoryError> {
        match self
            .ratings
            .iter()
            .find(|(_, r)| !(MIN_RATING..=MAX_RATING).contains(*r))
        {
            Some((&component, &rating)) => Err(HistoryError::InvalidComponentRating { component, rating }),
            None => Ok(()),
        }
    }

    /// Overlay `other` on top of `self`; blank improvement notes are ignored
    pub fn merge(&mut self, other: &ComponentFeedback) {
        self.ratings.extend(other.ratings.iter().map(|(k, v)| (*k, *v)));
        self.suggested_improvements.extend(
            other
                .suggested_improvements
                .iter()
                .filter(|(_, text)| !text.trim().is_empty())
                .map(|(k, v)| (*k, v.clone())),
        );
    }
}

/// One stored prompt conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub id: String,
    pub original_prompt: String,
    /// sha256 of the prompt, hex encoded
    pub prompt_hash: String,
    /// The mapped record; absent for failed conversions
    pub record: Option<Value>,
    pub success: bool,
    pub error_message: Option<String>,
    pub validation_passed: bool,
    pub rating: Option<u8>,
    pub feedback: Option<String>,
    pub times_used: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
}

impl Conversion {
    /// Tool names of the stored record
    pub fn tool_names(&self) -> Vec<&str> {
        self.record
            .as_ref()
            .and_then(|r| r.get("tools"))
            .and_then(Value::as_array)
            .map(|tools| {
                tools
                    .iter()
                    .filter_map(|t| t.get("name").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Output format of the stored record
    pub fn output_format(&self) -> Option<&str> {
        self.record
            .as_ref()
            .and_then(|r| r.get("outcome"))
            .and_then(|o| o.get("format"))
            .and_then(Value::as_str)
    }

    /// Topic variable of the stored record
    pub fn topic(&self) -> Option<&str> {
        self.record
            .as_ref()
            .and_then(|r| r.get("variables"))
            .and_then(|v| v.get("topic"))
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
    }
}

/// Aggregate usage figures
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub average_rating: Option<f64>,
    /// Most used tools as (name, count), count descending then name
    pub top_tools: Vec<(String, u64)>,
    /// Most produced output formats as (format, count)
    pub top_formats: Vec<(String, u64)>,
    /// Most common `variables.topic` values as (topic, count)
    pub top_topics: Vec<(String, u64)>,
}

impl HistoryStats {
    /// Share of successful conversions, 0.0 when empty
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successful as f64 / self.total as f64
        }
    }
}
