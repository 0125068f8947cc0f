// src/feed/mod.rs
pub mod config;
pub mod providers;
pub mod timeparse;
pub mod types;

use std::collections::HashSet;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

use crate::feed::types::{ContestRecord, ContestSource};

/// One-time metrics registration (so series show up for any exporter).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "feed_records_total",
            "Records parsed from sources, before dedup."
        );
        describe_counter!("feed_kept_total", "Records kept in the merged feed.");
        describe_counter!(
            "feed_dedup_total",
            "Records dropped as within-source duplicates."
        );
        describe_counter!("feed_source_errors_total", "Source fetch/parse failures.");
        describe_histogram!("feed_parse_ms", "Source parse time in milliseconds.");
        describe_gauge!("feed_last_run_ts", "Unix ts when the feed was last assembled.");
    });
}

/// Collapse repeated observations of the same contest within one source's
/// output. First observation wins. Ids are platform-prefixed, so cross-source
/// collisions cannot occur and are not checked.
pub fn dedup_by_id(records: Vec<ContestRecord>) -> (Vec<ContestRecord>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(records.len());
    let mut dropped = 0usize;

    for rec in records {
        if seen.insert(rec.id.clone()) {
            kept.push(rec);
        } else {
            dropped += 1;
        }
    }

    (kept, dropped)
}

/// Assemble the feed once. Sources run sequentially and independently; a
/// failed source is logged and skipped, so the worst case is an empty feed,
/// never an error to the caller.
pub async fn run_once(sources: &[Box<dyn ContestSource>]) -> Vec<ContestRecord> {
    ensure_metrics_described();

    let mut merged: Vec<ContestRecord> = Vec::new();
    for source in sources {
        match source.fetch().await {
            Ok(records) => {
                let (kept, dropped) = dedup_by_id(records);
                if dropped > 0 {
                    counter!("feed_dedup_total").increment(dropped as u64);
                }
                tracing::info!(
                    source = source.name(),
                    kept = kept.len(),
                    dedup = dropped,
                    "source fetched"
                );
                merged.extend(kept);
            }
            Err(e) => {
                tracing::warn!(error = ?e, source = source.name(), "source error, skipping");
                counter!("feed_source_errors_total").increment(1);
            }
        }
    }

    counter!("feed_kept_total").increment(merged.len() as u64);
    gauge!("feed_last_run_ts").set(chrono::Utc::now().timestamp().max(0) as f64);

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::types::{ContestStatus, NormalizedInstant, Platform, TimeConfidence};
    use chrono::DateTime;

    fn record(id: &str, name: &str) -> ContestRecord {
        let start = DateTime::from_timestamp(4_102_444_800, 0).unwrap();
        ContestRecord {
            id: id.to_string(),
            platform: Platform::Codeforces,
            name: name.to_string(),
            url: format!("https://codeforces.com/contest/{id}"),
            start: NormalizedInstant::Utc(start),
            end: NormalizedInstant::Utc(start + chrono::Duration::seconds(7200)),
            duration_seconds: 7200,
            status: ContestStatus::Upcoming,
            time_confidence: TimeConfidence::VerifiedUtc,
        }
    }

    #[test]
    fn duplicate_ids_keep_first_observation() {
        let raw = vec![
            record("cf-1", "first sighting"),
            record("cf-2", "unrelated"),
            record("cf-1", "second sighting"),
        ];
        let (kept, dropped) = dedup_by_id(raw);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 1);
        assert_eq!(kept[0].name, "first sighting");
    }

    #[test]
    fn distinct_ids_pass_untouched() {
        let raw = vec![record("cf-1", "a"), record("cf-2", "b")];
        let (kept, dropped) = dedup_by_id(raw);
        assert_eq!(kept.len(), 2);
        assert_eq!(dropped, 0);
    }
}
