//! Data models for collected news articles.
//!
//! This module defines the records that flow from the collector into the
//! analysis pipeline:
//! - [`Article`]: One collected news article, as stored in the corpus file
//! - [`NaverNewsItem`]: One raw item returned by the Naver news search API
//! - [`NaverSearchResponse`]: One page of search results
//!
//! Corpus files use the column names `pubDate`, `date`, `title` and
//! `description`, hence the serde renames.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Offset used when a stored timestamp carries no zone (KST, UTC+9).
const DEFAULT_OFFSET_SECS: i32 = 9 * 3600;

/// A collected news article.
///
/// Articles are immutable once collected. `date` is the calendar day of
/// `pub_date` and is the key for daily and weekly grouping.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Article {
    /// Publication timestamp as reported by the search API.
    #[serde(
        rename = "pubDate",
        deserialize_with = "deserialize_timestamp",
        serialize_with = "serialize_timestamp"
    )]
    pub pub_date: DateTime<FixedOffset>,
    /// Calendar day of publication.
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    /// Headline, possibly still containing `<b>` highlight markup.
    pub title: String,
    /// Snippet of the article body.
    pub description: String,
    /// Link to the publisher's own page.
    #[serde(rename = "originallink", default, skip_serializing_if = "Option::is_none")]
    pub original_link: Option<String>,
    /// Link to the portal copy of the article.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Article {
    /// Build an article whose `date` is derived from `pub_date`.
    pub fn new(pub_date: DateTime<FixedOffset>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            pub_date,
            date: pub_date.date_naive(),
            title: title.into(),
            description: description.into(),
            original_link: None,
            link: None,
        }
    }

    /// Extract the publisher's domain name (before the TLD) from the original link.
    /// For example: "https://www.yna.co.kr/view/AKR2025" -> "yna"
    pub fn publisher(&self) -> Option<String> {
        let link = self.original_link.as_deref().or(self.link.as_deref())?;
        let parsed = url::Url::parse(link).ok()?;
        let host = parsed.host_str()?;
        let parts: Vec<&str> = host
            .split('.')
            .filter(|p| !matches!(*p, "www" | "m" | "co" | "or" | "kr" | "com" | "net"))
            .collect();
        parts.last().map(|s| s.to_string())
    }
}

/// One page of the Naver news search API response.
#[allow(non_snake_case)]
#[derive(Debug, Deserialize)]
pub struct NaverSearchResponse {
    /// Time the response was generated (RFC 2822).
    #[serde(default)]
    pub lastBuildDate: String,
    /// Total number of matching articles.
    #[serde(default)]
    pub total: u64,
    /// 1-based index of the first item in this page.
    #[serde(default)]
    pub start: u32,
    /// Number of items requested for this page.
    #[serde(default)]
    pub display: u32,
    /// The articles in this page.
    #[serde(default)]
    pub items: Vec<NaverNewsItem>,
}

/// A raw news item as returned by the search API.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NaverNewsItem {
    pub title: String,
    pub originallink: String,
    pub link: String,
    pub description: String,
    /// Publication time in RFC 2822 format, e.g. `Mon, 23 Jun 2025 09:12:00 +0900`.
    pub pubDate: String,
}

impl TryFrom<NaverNewsItem> for Article {
    type Error = chrono::ParseError;

    fn try_from(item: NaverNewsItem) -> Result<Self, Self::Error> {
        let pub_date = DateTime::parse_from_rfc2822(&item.pubDate)?;
        let mut article = Article::new(pub_date, item.title, item.description);
        article.original_link = Some(item.originallink).filter(|s| !s.is_empty());
        article.link = Some(item.link).filter(|s| !s.is_empty());
        Ok(article)
    }
}

/// Parse a stored timestamp in any of the formats the corpus may contain.
///
/// Accepted: RFC 3339, RFC 2822, `YYYY-MM-DD HH:MM:SS[.f]±hh:mm`,
/// `YYYY-MM-DD HH:MM:SS` (read as KST) and a bare `YYYY-MM-DD` (midnight KST).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(ts);
    }
    let kst = FixedOffset::east_opt(DEFAULT_OFFSET_SECS)?;
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return kst.from_local_datetime(&naive).single();
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return kst.from_local_datetime(&day.and_hms_opt(0, 0, 0)?).single();
    }
    None
}

/// Parse a stored calendar date, accepting a full timestamp as well.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| raw.get(..10).and_then(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").ok()))
        .or_else(|| parse_timestamp(raw).map(|ts| ts.date_naive()))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp: {raw}")))
}

fn serialize_timestamp<S>(ts: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339())
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("unrecognized date: {raw}")))
}
