// src/feed/providers/geeksforgeeks.rs
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDateTime};
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::feed::timeparse;
use crate::feed::types::{
    ContestRecord, ContestSource, NormalizedInstant, Platform, SourceError, TimeConfidence,
};
use crate::lifecycle;

use super::BROWSER_USER_AGENT;

const CONTESTS_PAGE_URL: &str = "https://practice.geeksforgeeks.org/contests";
const SITE_ORIGIN: &str = "https://practice.geeksforgeeks.org";

/// Cards that carry no duration text get this instead of being dropped.
const DEFAULT_DURATION_SECS: i64 = 2 * 3600;

/// Every selector the card walk needs, parsed once per page. The class names
/// track the live front-end and are the first thing to re-check when this
/// adapter starts returning zero records.
struct CardSelectors {
    primary: Selector,
    fallback: Selector,
    name: Selector,
    link: Selector,
    time_info: Selector,
    duration: Selector,
}

impl CardSelectors {
    fn new() -> Self {
        Self {
            primary: Selector::parse("div.gfg-contest-card__container").unwrap(),
            fallback: Selector::parse(r#"div[class*="card"][class*="contest"]"#).unwrap(),
            name: Selector::parse(".gfg-contest-card__name, .contest-name, h3").unwrap(),
            link: Selector::parse(r#"a.gfg-contest-card__button--detail, a[href*="/contests/"]"#)
                .unwrap(),
            time_info: Selector::parse(
                ".gfg-contest-card__status--upcoming, .gfg-contest-card__status--active, .contest-timing",
            )
            .unwrap(),
            duration: Selector::parse(r#".gfg-contest-card__duration, span[class*="duration"]"#)
                .unwrap(),
        }
    }
}

pub struct GeeksforGeeksSource {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl GeeksforGeeksSource {
    pub fn from_fixture(body: &str) -> Self {
        Self {
            mode: Mode::Fixture(body.to_string()),
        }
    }

    pub fn from_url() -> Self {
        Self::from_url_with(CONTESTS_PAGE_URL)
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

    /// Visible text of an element: entity-decoded, whitespace-collapsed.
    fn element_text(el: ElementRef<'_>) -> String {
        static RE_WS: OnceCell<Regex> = OnceCell::new();
        let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());

        let raw = el.text().collect::<String>();
        let decoded = html_escape::decode_html_entities(&raw);
        re_ws.replace_all(decoded.trim(), " ").to_string()
    }

    /// Sum "X hr" / "Y min" quantities out of free duration text.
    fn parse_duration_secs(text: &str) -> Option<i64> {
        static RE_HOURS: OnceCell<Regex> = OnceCell::new();
        static RE_MINS: OnceCell<Regex> = OnceCell::new();
        let re_hours = RE_HOURS.get_or_init(|| Regex::new(r"(\d+)\s*hr").unwrap());
        let re_mins = RE_MINS.get_or_init(|| Regex::new(r"(\d+)\s*min").unwrap());

        let text = text.to_lowercase();
        let mut total = 0i64;
        if let Some(c) = re_hours.captures(&text) {
            total += c[1].parse::<i64>().unwrap_or(0) * 3600;
        }
        if let Some(c) = re_mins.captures(&text) {
            total += c[1].parse::<i64>().unwrap_or(0) * 60;
        }
        (total > 0).then_some(total)
    }

    /// Stable identifier: the URL path segment when the link has one, else
    /// the hyphenated lowercased name.
    fn contest_slug(href: &str, name: &str) -> String {
        static RE_SLUG: OnceCell<Regex> = OnceCell::new();
        let re_slug = RE_SLUG.get_or_init(|| Regex::new(r"/contests?/([^/]+)/?$").unwrap());

        match re_slug.captures(href) {
            Some(c) => c[1].to_string(),
            None => name.to_lowercase().replace(' ', "-"),
        }
    }

    fn parse_card(
        selectors: &CardSelectors,
        card: ElementRef<'_>,
        now: NaiveDateTime,
    ) -> Option<ContestRecord> {
        // Name, link and time text are the card's essentials; a card missing
        // any of them is skipped without noise.
        let name_el = card.select(&selectors.name).next()?;
        let link_el = card.select(&selectors.link).next()?;
        let time_el = card.select(&selectors.time_info).next()?;

        let name = Self::element_text(name_el);
        if name.is_empty() {
            return None;
        }

        let href = link_el.value().attr("href")?;
        let url = if href.starts_with('/') {
            format!("{SITE_ORIGIN}{href}")
        } else {
            href.to_string()
        };

        let time_text = Self::element_text(time_el);
        let start = match timeparse::parse_display_time(&time_text) {
            Ok(dt) => dt,
            Err(e) => {
                tracing::warn!(
                    source = "GeeksforGeeks",
                    contest = %name,
                    error = %e,
                    "skipping contest with unusable start time"
                );
                return None;
            }
        };

        let duration_secs = card
            .select(&selectors.duration)
            .next()
            .map(Self::element_text)
            .and_then(|text| Self::parse_duration_secs(&text))
            .unwrap_or_else(|| {
                tracing::debug!(
                    source = "GeeksforGeeks",
                    contest = %name,
                    "no duration on card, assuming 2 hours"
                );
                DEFAULT_DURATION_SECS
            });

        let end = start + Duration::seconds(duration_secs);

        // "now" and the parsed times share the same unverified local frame;
        // that is the best this source offers.
        let status = lifecycle::classify(start, end, now).as_status()?;

        let slug = Self::contest_slug(href, &name);
        Some(ContestRecord {
            id: format!("gfg-{slug}"),
            platform: Platform::GeeksforGeeks,
            name,
            url,
            start: NormalizedInstant::LocalNaive(start),
            end: NormalizedInstant::LocalNaive(end),
            duration_seconds: duration_secs,
            status,
            time_confidence: TimeConfidence::AssumedLocalNaive,
        })
    }

    /// Decode one contests page into feed records. Pure in `now`, so tests
    /// can pin the clock.
    pub fn records_from_page(body: &str, now: NaiveDateTime) -> Result<Vec<ContestRecord>> {
        let t0 = std::time::Instant::now();
        let doc = Html::parse_document(body);
        let selectors = CardSelectors::new();

        let mut cards: Vec<ElementRef<'_>> = doc.select(&selectors.primary).collect();
        if cards.is_empty() {
            // Looser class-substring match survives minor front-end renames.
            cards = doc.select(&selectors.fallback).collect();
        }
        if cards.is_empty() {
            return Err(SourceError::SchemaDrift(
                "no contest cards matched either selector".to_string(),
            )
            .into());
        }

        let mut out = Vec::new();
        for card in cards {
            if let Some(rec) = Self::parse_card(&selectors, card, now) {
                out.push(rec);
            }
        }

        histogram!("feed_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("feed_records_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl ContestSource for GeeksforGeeksSource {
    async fn fetch(&self) -> Result<Vec<ContestRecord>> {
        match &self.mode {
            Mode::Fixture(body) => Self::records_from_page(body, Local::now().naive_local()),
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
                Self::records_from_page(&body, Local::now().naive_local())
            }
        }
    }

    fn name(&self) -> &'static str {
        "GeeksforGeeks"
    }
}
