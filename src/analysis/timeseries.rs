//! Article counts over time and calendar bucketing.

use crate::models::Article;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Headline numbers for a corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusSummary {
    pub article_count: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Days between the first and last publication date.
    pub period_days: i64,
    /// Articles per day over the period, with the period floored at one day.
    pub daily_average: f64,
}

/// Where a day falls relative to the title's release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePhase {
    BeforeRelease,
    /// The release month itself.
    ReleaseMonth,
    /// The month after release.
    OneMonthLater,
    /// Two or more months after release.
    TwoMonthsOrMore,
}

impl ReleasePhase {
    pub fn classify(date: NaiveDate, release: NaiveDate) -> Self {
        let months = (date.year() - release.year()) * 12 + date.month() as i32 - release.month() as i32;
        match months {
            m if m < 0 => ReleasePhase::BeforeRelease,
            0 => ReleasePhase::ReleaseMonth,
            1 => ReleasePhase::OneMonthLater,
            _ => ReleasePhase::TwoMonthsOrMore,
        }
    }

    /// Dashboard legend label.
    pub fn label(&self) -> &'static str {
        match self {
            ReleasePhase::BeforeRelease => "개봉 전",
            ReleasePhase::ReleaseMonth => "개봉 후",
            ReleasePhase::OneMonthLater => "한달 후",
            ReleasePhase::TwoMonthsOrMore => "두달 이상",
        }
    }
}

/// Number of articles published on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
    /// ISO week number of the day.
    pub iso_week: u32,
    pub phase: ReleasePhase,
}

pub fn summarize(articles: &[Article]) -> CorpusSummary {
    let first_date = articles.iter().map(|a| a.date).min();
    let last_date = articles.iter().map(|a| a.date).max();
    let period_days = match (first_date, last_date) {
        (Some(first), Some(last)) => (last - first).num_days(),
        _ => 0,
    };
    CorpusSummary {
        article_count: articles.len(),
        first_date,
        last_date,
        period_days,
        daily_average: articles.len() as f64 / period_days.max(1) as f64,
    }
}

/// Article counts per calendar day, oldest first. Days without articles are absent.
pub fn daily_counts(articles: &[Article], release: NaiveDate) -> Vec<DailyCount> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for article in articles {
        *per_day.entry(article.date).or_insert(0) += 1;
    }
    per_day
        .into_iter()
        .map(|(date, count)| DailyCount {
            date,
            count,
            iso_week: date.iso_week().week(),
            phase: ReleasePhase::classify(date, release),
        })
        .collect()
}

/// Month-relative week label, e.g. `06월 3주차` for June 15-21.
pub fn week_label(date: NaiveDate) -> String {
    format!("{:02}월 {}주차", date.month(), (date.day() - 1) / 7 + 1)
}

/// Group articles by week label, buckets in order of first appearance.
pub fn group_by_week(articles: &[Article]) -> Vec<(String, Vec<&Article>)> {
    let mut buckets: Vec<(String, Vec<&Article>)> = Vec::new();
    for article in articles {
        let label = week_label(article.date);
        match buckets.iter_mut().find(|(l, _)| *l == label) {
            Some((_, members)) => members.push(article),
            None => buckets.push((label, vec![article])),
        }
    }
    buckets
}
