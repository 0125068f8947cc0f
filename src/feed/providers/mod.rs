// src/feed/providers/mod.rs
pub mod codeforces;
pub mod geeksforgeeks;
pub mod leetcode;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::feed::types::{ContestSource, Platform};
use crate::throttle::CallGate;

use self::codeforces::CodeforcesSource;
use self::geeksforgeeks::GeeksforGeeksSource;
use self::leetcode::LeetCodeSource;

/// Browser-like UA for the scraped pages; some of them serve a degraded
/// variant to the default client string.
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Build live sources for the enabled platforms. All Codeforces sources share
/// one call gate, so the API cooldown holds across the whole process.
pub fn build_sources(enabled: &[Platform]) -> Vec<Box<dyn ContestSource>> {
    let cf_gate = Arc::new(Mutex::new(CallGate::new(codeforces::MIN_CALL_INTERVAL_MS)));

    let mut sources: Vec<Box<dyn ContestSource>> = Vec::with_capacity(enabled.len());
    for platform in enabled {
        match platform {
            Platform::Codeforces => {
                sources.push(Box::new(CodeforcesSource::from_url(Arc::clone(&cf_gate))))
            }
            Platform::LeetCode => sources.push(Box::new(LeetCodeSource::from_url())),
            Platform::GeeksforGeeks => sources.push(Box::new(GeeksforGeeksSource::from_url())),
        }
    }
    sources
}
