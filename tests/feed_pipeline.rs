// tests/feed_pipeline.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::DateTime;
use contest_calendar::feed;
use contest_calendar::feed::types::NormalizedInstant;
use contest_calendar::{ContestRecord, ContestSource, ContestStatus, Platform, TimeConfidence};

fn upcoming(id: &str) -> ContestRecord {
    let start = DateTime::from_timestamp(4_102_444_800, 0).unwrap();
    ContestRecord {
        id: id.to_string(),
        platform: Platform::Codeforces,
        name: format!("Stub round {id}"),
        url: format!("https://codeforces.com/contest/{id}"),
        start: NormalizedInstant::Utc(start),
        end: NormalizedInstant::Utc(start + chrono::Duration::seconds(7200)),
        duration_seconds: 7200,
        status: ContestStatus::Upcoming,
        time_confidence: TimeConfidence::VerifiedUtc,
    }
}

struct StubSource {
    records: Vec<ContestRecord>,
}

#[async_trait]
impl ContestSource for StubSource {
    async fn fetch(&self) -> Result<Vec<ContestRecord>> {
        Ok(self.records.clone())
    }
    fn name(&self) -> &'static str {
        "Stub"
    }
}

struct BrokenSource;

#[async_trait]
impl ContestSource for BrokenSource {
    async fn fetch(&self) -> Result<Vec<ContestRecord>> {
        Err(anyhow!("schema drift: nothing matched"))
    }
    fn name(&self) -> &'static str {
        "Broken"
    }
}

#[tokio::test]
async fn failing_source_does_not_poison_the_feed() {
    let sources: Vec<Box<dyn ContestSource>> = vec![
        Box::new(BrokenSource),
        Box::new(StubSource {
            records: vec![upcoming("cf-1"), upcoming("cf-2")],
        }),
    ];
    let out = feed::run_once(&sources).await;
    assert_eq!(out.len(), 2);
}

#[tokio::test]
async fn all_sources_failing_yields_empty_feed() {
    let sources: Vec<Box<dyn ContestSource>> =
        vec![Box::new(BrokenSource), Box::new(BrokenSource)];
    let out = feed::run_once(&sources).await;
    assert!(out.is_empty());
}

#[tokio::test]
async fn per_source_output_order_is_preserved() {
    let sources: Vec<Box<dyn ContestSource>> = vec![
        Box::new(StubSource {
            records: vec![upcoming("cf-2"), upcoming("cf-1")],
        }),
        Box::new(StubSource {
            records: vec![upcoming("lc-9")],
        }),
    ];
    let out = feed::run_once(&sources).await;
    let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["cf-2", "cf-1", "lc-9"]);
}
