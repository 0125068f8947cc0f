// src/feed/providers/leetcode.rs
use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use metrics::{counter, histogram};
use scraper::{Html, Selector};
use serde_json::Value;

use crate::feed::timeparse;
use crate::feed::types::{
    ContestRecord, ContestSource, NormalizedInstant, Platform, SourceError, TimeConfidence,
};
use crate::lifecycle;

use super::BROWSER_USER_AGENT;

const CONTEST_PAGE_URL: &str = "https://leetcode.com/contest/";

pub struct LeetCodeSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl LeetCodeSource {
    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    pub fn from_url() -> Self {
        Self::from_url_with(CONTEST_PAGE_URL)
    }

    pub fn from_url_with(url: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .unwrap();
        Self {
            mode: Mode::Http {
                url: url.to_string(),
                client,
            },
        }
    }

    /// Pull the page-embedded JSON out of the document. The script tag is the
    /// one stable anchor; everything below it is provider-controlled.
    fn next_data(html: &str) -> Result<Value, SourceError> {
        let doc = Html::parse_document(html);
        let sel = Selector::parse("script#__NEXT_DATA__").unwrap();
        let script = doc.select(&sel).next().ok_or_else(|| {
            SourceError::SchemaDrift("__NEXT_DATA__ script tag not found".to_string())
        })?;
        let raw = script.text().collect::<String>();
        serde_json::from_str(&raw)
            .map_err(|e| SourceError::MalformedPayload(format!("__NEXT_DATA__ body: {e}")))
    }

    /// Walk the dehydrated query cache. Every step is optional on purpose:
    /// the nested path shifts between front-end releases, and an absent step
    /// must read as "no contests", not a crash.
    fn collect_contest_entries(data: &Value) -> Vec<&Value> {
        let mut entries: Vec<&Value> = Vec::new();
        let queries = data
            .get("props")
            .and_then(|v| v.get("pageProps"))
            .and_then(|v| v.get("dehydratedState"))
            .and_then(|v| v.get("queries"))
            .and_then(Value::as_array);

        let Some(queries) = queries else {
            return entries;
        };

        for query in queries {
            let Some(data) = query.get("state").and_then(|s| s.get("data")) else {
                continue;
            };
            for key in ["topTwoContests", "upcomingContests"] {
                if let Some(list) = data.get(key).and_then(Value::as_array) {
                    entries.extend(list.iter());
                }
            }
        }
        entries
    }

    /// Decode one contest page into feed records. Pure in `now`, so tests can
    /// pin the clock.
    pub fn records_from_page(body: &str, now: DateTime<Utc>) -> Result<Vec<ContestRecord>> {
        let t0 = std::time::Instant::now();
        let data = Self::next_data(body)?;
        let entries = Self::collect_contest_entries(&data);
        if entries.is_empty() {
            tracing::warn!(
                source = "LeetCode",
                "no contest lists found in __NEXT_DATA__"
            );
            return Ok(Vec::new());
        }

        let mut seen_slugs: HashSet<String> = HashSet::new();
        let mut out = Vec::new();

        for entry in entries {
            let Some(slug) = entry.get("titleSlug").and_then(Value::as_str) else {
                continue;
            };
            if !seen_slugs.insert(slug.to_string()) {
                continue; // the same contest surfaces in both lists
            }

            let (Some(start_secs), Some(duration)) = (
                entry.get("startTime").and_then(Value::as_i64),
                entry.get("duration").and_then(Value::as_i64),
            ) else {
                tracing::warn!(
                    source = "LeetCode",
                    slug,
                    "missing start time or duration, skipping"
                );
                continue;
            };
            if duration < 0 {
                tracing::warn!(source = "LeetCode", slug, duration, "negative duration, skipping");
                continue;
            }

            let start = match timeparse::epoch_utc(start_secs) {
                Ok(dt) => dt,
                Err(e) => {
                    tracing::warn!(
                        source = "LeetCode",
                        slug,
                        error = %e,
                        "skipping contest with unusable start time"
                    );
                    continue;
                }
            };
            let end = start + Duration::seconds(duration);

            let Some(status) = lifecycle::classify(start, end, now).as_status() else {
                continue;
            };

            let name = entry
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("N/A")
                .to_string();

            out.push(ContestRecord {
                id: format!("lc-{slug}"),
                platform: Platform::LeetCode,
                name,
                url: format!("https://leetcode.com/contest/{slug}/"),
                start: NormalizedInstant::Utc(start),
                end: NormalizedInstant::Utc(end),
                duration_seconds: duration,
                status,
                time_confidence: TimeConfidence::VerifiedUtc,
            });
        }

        histogram!("feed_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("feed_records_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl ContestSource for LeetCodeSource {
    async fn fetch(&self) -> Result<Vec<ContestRecord>> {
        match &self.mode {
            Mode::Fixture(body) => Self::records_from_page(body, Utc::now()),
            Mode::Http { url, client } => {
                let body = client
                    .get(url)
                    .send()
                    .await
                    .and_then(|resp| resp.error_for_status())
                    .map_err(SourceError::Network)?
                    .text()
                    .await
                    .map_err(SourceError::Network)?;
                Self::records_from_page(&body, Utc::now())
            }
        }
    }

    fn name(&self) -> &'static str {
        "LeetCode"
    }
}
