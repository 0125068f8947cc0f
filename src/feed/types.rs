// src/feed/types.rs
use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// The closed set of platforms this feed aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Platform {
    Codeforces,
    LeetCode,
    GeeksforGeeks,
}

impl Platform {
    pub const ALL: [Platform; 3] = [
        Platform::Codeforces,
        Platform::LeetCode,
        Platform::GeeksforGeeks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Codeforces => "Codeforces",
            Platform::LeetCode => "LeetCode",
            Platform::GeeksforGeeks => "GeeksforGeeks",
        }
    }

    /// Case-insensitive lookup used by the sources config.
    pub fn from_name(name: &str) -> Option<Platform> {
        match name.to_ascii_lowercase().as_str() {
            "codeforces" => Some(Platform::Codeforces),
            "leetcode" => Some(Platform::LeetCode),
            "geeksforgeeks" | "gfg" => Some(Platform::GeeksforGeeks),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle label carried on emitted records. Finished contests never reach
/// the output, so there is no third value here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContestStatus {
    Upcoming,
    Ongoing,
}

/// Whether a record's instants carry verified UTC semantics or are a
/// best-effort reading of timezone-less display text. Consumers must treat
/// `AssumedLocalNaive` records as approximate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeConfidence {
    VerifiedUtc,
    AssumedLocalNaive,
}

/// An absolute point in time as produced by the time normalizer. The variant
/// is the confidence tag: `Utc` values come only from epoch or explicit-offset
/// inputs, `LocalNaive` values only from free text with no timezone marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedInstant {
    Utc(DateTime<Utc>),
    LocalNaive(NaiveDateTime),
}

impl NormalizedInstant {
    pub fn confidence(&self) -> TimeConfidence {
        match self {
            NormalizedInstant::Utc(_) => TimeConfidence::VerifiedUtc,
            NormalizedInstant::LocalNaive(_) => TimeConfidence::AssumedLocalNaive,
        }
    }

    /// ISO-8601 rendering: UTC instants carry an explicit `+00:00` offset,
    /// naive instants carry none.
    pub fn to_iso(&self) -> String {
        match self {
            NormalizedInstant::Utc(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, false),
            NormalizedInstant::LocalNaive(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }

    /// Epoch seconds for verified-UTC instants. Naive instants have no
    /// trustworthy epoch anchor and yield `None`.
    pub fn epoch_seconds(&self) -> Option<i64> {
        match self {
            NormalizedInstant::Utc(dt) => Some(dt.timestamp()),
            NormalizedInstant::LocalNaive(_) => None,
        }
    }
}

fn instant_iso<S: Serializer>(t: &NormalizedInstant, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&t.to_iso())
}

/// One normalized contest, the unified output entity of the whole engine.
/// Constructed fresh on every run, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContestRecord {
    pub id: String,
    pub platform: Platform,
    pub name: String,
    pub url: String,
    #[serde(rename = "start_time_iso", serialize_with = "instant_iso")]
    pub start: NormalizedInstant,
    #[serde(rename = "end_time_iso", serialize_with = "instant_iso")]
    pub end: NormalizedInstant,
    pub duration_seconds: i64,
    pub status: ContestStatus,
    pub time_confidence: TimeConfidence,
}

/// Failure taxonomy for a single source. Everything here is caught at the
/// adapter boundary and downgraded to "skip this record" or "skip this
/// source"; nothing crosses into the aggregator as a panic.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("schema drift: {0}")]
    SchemaDrift(String),
    #[error("unparseable time text: {0:?}")]
    UnparseableTime(String),
}

#[async_trait::async_trait]
pub trait ContestSource {
    async fn fetch(&self) -> Result<Vec<ContestRecord>>;
    fn name(&self) -> &'static str;
}
