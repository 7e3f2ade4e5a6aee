//! Filter and sort engine
//!
//! Derives the displayed list from the full prompt set. Everything here is
//! pure: the caller passes the instant the query runs.

use crate::core::data::Prompt;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Category predicate; `All` is the "show everything" sentinel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

/// Relative-date predicate on creation time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    #[default]
    Any,
    Today,
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Updated,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptQuery {
    pub text: String,
    pub category: CategoryFilter,
    pub favorites_only: bool,
    pub time_window: TimeWindow,
    pub sort: SortKey,
}

impl CategoryFilter {
    pub fn from_option(category: Option<&str>) -> Self {
        match category {
            Some(name) if !name.is_empty() => CategoryFilter::Named(name.to_string()),
            _ => CategoryFilter::All,
        }
    }

    fn matches(&self, prompt: &Prompt) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(name) => prompt.category.as_deref() == Some(name.as_str()),
        }
    }
}

impl TimeWindow {
    /// Earliest creation instant admitted by this window, if any
    pub fn cutoff<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        let now_utc = now.with_timezone(&Utc);
        match self {
            TimeWindow::Any => None,
            TimeWindow::Today => {
                let midnight = now.date_naive().and_time(NaiveTime::MIN);
                let start = now
                    .timezone()
                    .from_local_datetime(&midnight)
                    .earliest()
                    .map(|d| d.with_timezone(&Utc))
                    // midnight skipped by a DST jump; fall back to a rolling day
                    .unwrap_or_else(|| now_utc - Duration::days(1));
                Some(start)
            }
            TimeWindow::Week => Some(now_utc - Duration::days(7)),
            TimeWindow::Month => Some(now_utc - Duration::days(30)),
        }
    }
}

impl PromptQuery {
    pub fn matches_text(&self, prompt: &Prompt) -> bool {
        if self.text.is_empty() {
            return true;
        }
        let needle = self.text.to_lowercase();
        prompt.title.to_lowercase().contains(&needle)
            || prompt.content.to_lowercase().contains(&needle)
            || prompt.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    fn matches(&self, prompt: &Prompt, cutoff: Option<DateTime<Utc>>) -> bool {
        self.matches_text(prompt)
            && self.category.matches(prompt)
            && (!self.favorites_only || prompt.favorite)
            && cutoff.is_none_or(|c| prompt.created_at >= c)
    }
}

/// Apply every predicate of `query` and order the survivors by its sort key
pub fn apply<Tz: TimeZone>(prompts: &[Prompt], query: &PromptQuery, now: &DateTime<Tz>) -> Vec<Prompt> {
    let cutoff = query.time_window.cutoff(now);

    let mut result: Vec<Prompt> = prompts
        .iter()
        .filter(|p| query.matches(p, cutoff))
        .cloned()
        .collect();

    sort_prompts(&mut result, query.sort);
    result
}

pub fn sort_prompts(prompts: &mut [Prompt], key: SortKey) {
    match key {
        SortKey::Newest => prompts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Oldest => prompts.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortKey::Updated => prompts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
    }
}
