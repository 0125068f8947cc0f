// src/feed/providers/codeforces.rs
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use metrics::{counter, histogram};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::feed::timeparse;
use crate::feed::types::{
    ContestRecord, ContestSource, NormalizedInstant, Platform, SourceError, TimeConfidence,
};
use crate::lifecycle;
use crate::throttle::CallGate;

const CONTEST_LIST_URL: &str = "https://codeforces.com/api/contest.list?gym=false";

/// The Codeforces API throttles bursts; every call through this adapter
/// honors a fixed spacing instead of retrying on throttle responses.
pub const MIN_CALL_INTERVAL_MS: i64 = 500;

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    status: String,
    comment: Option<String>,
    #[serde(default)]
    result: Vec<ApiContest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiContest {
    id: i64,
    name: String,
    phase: String,
    start_time_seconds: Option<i64>,
    duration_seconds: Option<i64>,
}

pub struct CodeforcesSource {
    mode: Mode,
    gate: Arc<Mutex<CallGate>>,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl CodeforcesSource {
    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
            gate: Arc::new(Mutex::new(CallGate::new(MIN_CALL_INTERVAL_MS))),
        }
    }

    pub fn from_url(gate: Arc<Mutex<CallGate>>) -> Self {
        Self::from_url_with(CONTEST_LIST_URL, gate)
    }

    pub fn from_url_with(url: &str, gate: Arc<Mutex<CallGate>>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();
        Self {
            mode: Mode::Http {
                url: url.to_string(),
                client,
            },
            gate,
        }
    }

    /// Decode one `contest.list` response into feed records. Pure in `now`,
    /// so tests can pin the clock.
    pub fn records_from_response(body: &str, now: DateTime<Utc>) -> Result<Vec<ContestRecord>> {
        let t0 = std::time::Instant::now();
        let envelope: ApiEnvelope = serde_json::from_str(body)
            .map_err(|e| SourceError::MalformedPayload(format!("contest.list body: {e}")))?;

        if envelope.status != "OK" {
            let comment = envelope.comment.unwrap_or_else(|| "no comment".to_string());
            return Err(
                SourceError::MalformedPayload(format!("api status not OK: {comment}")).into(),
            );
        }

        let mut out = Vec::new();
        for contest in envelope.result {
            // Upstream pre-filter: anything the API already reports finished
            // never reaches normalization.
            if contest.phase == "FINISHED" {
                continue;
            }

            let (Some(start_secs), Some(duration)) =
                (contest.start_time_seconds, contest.duration_seconds)
            else {
                tracing::warn!(
                    source = "Codeforces",
                    contest = %contest.name,
                    "missing start time or duration, skipping"
                );
                continue;
            };
            if duration < 0 {
                tracing::warn!(
                    source = "Codeforces",
                    contest = %contest.name,
                    duration,
                    "negative duration, skipping"
                );
                continue;
            }

            let start = match timeparse::epoch_utc(start_secs) {
                Ok(dt) => dt,
                Err(e) => {
                    tracing::warn!(
                        source = "Codeforces",
                        contest = %contest.name,
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

            out.push(ContestRecord {
                id: format!("cf-{}", contest.id),
                platform: Platform::Codeforces,
                name: contest.name,
                url: format!("https://codeforces.com/contest/{}", contest.id),
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
impl ContestSource for CodeforcesSource {
    async fn fetch(&self) -> Result<Vec<ContestRecord>> {
        match &self.mode {
            Mode::Fixture(body) => Self::records_from_response(body, Utc::now()),
            Mode::Http { url, client } => {
                // All Codeforces calls serialize through the shared gate; a
                // fixed spacing avoids the API throttle entirely.
                let mut gate = self.gate.lock().await;
                let wait = gate.wait_before_call(Utc::now());
                if !wait.is_zero() {
                    tokio::time::sleep(wait).await;
                }
                let result = client.get(url).send().await;
                gate.record_call(Utc::now());
                drop(gate);

                let body = result
                    .and_then(|resp| resp.error_for_status())
                    .map_err(SourceError::Network)?
                    .text()
                    .await
                    .map_err(SourceError::Network)?;
                Self::records_from_response(&body, Utc::now())
            }
        }
    }

    fn name(&self) -> &'static str {
        "Codeforces"
    }
}
