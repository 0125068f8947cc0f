// tests/feed_dedup.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::DateTime;
use contest_calendar::feed;
use contest_calendar::feed::types::NormalizedInstant;
use contest_calendar::{ContestRecord, ContestSource, ContestStatus, Platform, TimeConfidence};

fn record(id: &str, name: &str) -> ContestRecord {
    let start = DateTime::from_timestamp(4_102_444_800, 0).unwrap();
    ContestRecord {
        id: id.to_string(),
        platform: Platform::LeetCode,
        name: name.to_string(),
        url: format!("https://leetcode.com/contest/{id}/"),
        start: NormalizedInstant::Utc(start),
        end: NormalizedInstant::Utc(start + chrono::Duration::seconds(5400)),
        duration_seconds: 5400,
        status: ContestStatus::Upcoming,
        time_confidence: TimeConfidence::VerifiedUtc,
    }
}

/// A source that observed the same contest twice in one run.
struct DoubledSource;

#[async_trait]
impl ContestSource for DoubledSource {
    async fn fetch(&self) -> Result<Vec<ContestRecord>> {
        Ok(vec![
            record("lc-weekly-contest-500", "Weekly Contest 500"),
            record("lc-weekly-contest-500", "Weekly Contest 500 (rerun card)"),
            record("lc-biweekly-contest-200", "Biweekly Contest 200"),
        ])
    }
    fn name(&self) -> &'static str {
        "Doubled"
    }
}

#[tokio::test]
async fn repeated_ids_within_one_source_keep_first_observation() {
    let sources: Vec<Box<dyn ContestSource>> = vec![Box::new(DoubledSource)];
    let out = feed::run_once(&sources).await;
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].name, "Weekly Contest 500");
    assert_eq!(out[1].id, "lc-biweekly-contest-200");
}
