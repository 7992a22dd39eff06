use chrono::{Duration, Local, NaiveDate, NaiveDateTime};

use super::common::NEWS_CATEGORIES;
use super::template::Fields;

const NEWS_TEMPLATE: &str = r#"
Fetch local civic and infrastructure news updates published from {start_date} to {end_date}
for the city of {city}, focusing on its specific localities or neighborhoods,
in the following categories:
{categories}.

For each relevant story, include:
- City and a context-appropriate locality/neighborhood
- A 1-2 line summary of the issue/development
- Reporting date (in YYYY-MM-DD format)
- A reliable source link which should be original

Only return news reported between {start_date} and {end_date} that fits the categories.
Exclude older or unrelated topics.
Format the response cleanly as a list with each item separated by a blank line.
"#;

pub fn news_template() -> String {
    NEWS_TEMPLATE.to_string()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeFrame {
    /// The last 7 days.
    Weekly,
    /// The last 24 hours.
    Daily,
}

impl TimeFrame {
    fn lookback(self) -> Duration {
        match self {
            TimeFrame::Weekly => Duration::days(7),
            TimeFrame::Daily => Duration::hours(24),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn ending_at(now: NaiveDateTime, frame: TimeFrame) -> Self {
        Self {
            start: (now - frame.lookback()).date(),
            end: now.date(),
        }
    }

    /// The range ending at the current local time.
    pub fn current(frame: TimeFrame) -> Self {
        Self::ending_at(Local::now().naive_local(), frame)
    }

    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

pub fn news_fields(city: &str, range: &DateRange) -> Fields {
    Fields::new()
        .with("city", city.trim())
        .with("start_date", range.start_str())
        .with("end_date", range.end_str())
        .with("categories", NEWS_CATEGORIES)
}
