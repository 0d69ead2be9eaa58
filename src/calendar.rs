// 🗓️ Calendar Display Model - Month grid + events keyed by date
//
// Front-end independent: the TUI draws it with ratatui, the web page gets the
// same events as JSON. A month is always shown as 6 weeks × 7 days.

use crate::projector::BillingEvent;
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weeks shown per month grid
pub const GRID_WEEKS: usize = 6;

// ============================================================================
// WEEK START
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(&self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    /// Days between the start of the week and `day`.
    fn offset(&self, day: Weekday) -> u32 {
        match self {
            WeekStart::Sunday => day.num_days_from_sunday(),
            WeekStart::Monday => day.num_days_from_monday(),
        }
    }

    /// Column headers in display order.
    pub fn headers(&self) -> [&'static str; 7] {
        match self {
            WeekStart::Sunday => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
            WeekStart::Monday => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
        }
    }
}

// ============================================================================
// CALENDAR MONTH
// ============================================================================

/// A calendar month, stored as its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarMonth {
    first: NaiveDate,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| CalendarMonth { first })
    }

    /// The month `date` falls in.
    pub fn containing(date: NaiveDate) -> Self {
        CalendarMonth {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last_day()
    }

    /// Following month; stays put at the end of the calendar.
    pub fn next(&self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| CalendarMonth { first })
            .unwrap_or(*self)
    }

    pub fn previous(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| CalendarMonth { first })
            .unwrap_or(*self)
    }

    /// "January 2024"
    pub fn title(&self) -> String {
        self.first.format("%B %Y").to_string()
    }

    /// Six rows of seven dates covering the month, padded with the
    /// neighbouring months' days.
    pub fn weeks(&self, week_start: WeekStart) -> Vec<Vec<NaiveDate>> {
        let lead = week_start.offset(self.first.weekday());
        let grid_start = self
            .first
            .checked_sub_days(Days::new(u64::from(lead)))
            .unwrap_or(self.first);

        let days: Vec<NaiveDate> = grid_start.iter_days().take(GRID_WEEKS * 7).collect();
        days.chunks(7).map(|week| week.to_vec()).collect()
    }
}

// ============================================================================
// EVENT GROUPING
// ============================================================================

/// Events keyed by occurrence date, dates ascending, store order within a day.
pub fn group_by_date<'e, 'a>(
    events: &'e [BillingEvent<'a>],
) -> BTreeMap<NaiveDate, Vec<&'e BillingEvent<'a>>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&'e BillingEvent<'a>>> = BTreeMap::new();
    for event in events {
        by_date.entry(event.date).or_default().push(event);
    }
    by_date
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::project_all;
    use crate::subscription::{Frequency, Price, Subscription};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_month_basics() {
        let month = CalendarMonth::new(2024, 2).unwrap();
        assert_eq!(month.year(), 2024);
        assert_eq!(month.month(), 2);
        assert_eq!(month.first_day(), date("2024-02-01"));
        assert_eq!(month.last_day(), date("2024-02-29"));
        assert_eq!(month.title(), "February 2024");
        assert!(month.contains(date("2024-02-29")));
        assert!(!month.contains(date("2024-03-01")));
        assert!(CalendarMonth::new(2024, 13).is_none());
    }

    #[test]
    fn test_month_containing() {
        let month = CalendarMonth::containing(date("2023-12-25"));
        assert_eq!(month, CalendarMonth::new(2023, 12).unwrap());
    }

    #[test]
    fn test_month_navigation_crosses_years() {
        let december = CalendarMonth::new(2023, 12).unwrap();
        assert_eq!(december.next(), CalendarMonth::new(2024, 1).unwrap());
        assert_eq!(december.next().previous(), december);

        let january = CalendarMonth::new(2024, 1).unwrap();
        assert_eq!(january.previous(), december);
    }

    #[test]
    fn test_weeks_sunday_start() {
        // 2024-09-01 is a Sunday, so the grid starts on the 1st
        let month = CalendarMonth::new(2024, 9).unwrap();
        let weeks = month.weeks(WeekStart::Sunday);

        assert_eq!(weeks.len(), 6);
        assert!(weeks.iter().all(|week| week.len() == 7));
        assert_eq!(weeks[0][0], date("2024-09-01"));
        assert_eq!(weeks[5][6], date("2024-10-12"));
    }

    #[test]
    fn test_weeks_monday_start() {
        // 2024-01-01 is a Monday
        let month = CalendarMonth::new(2024, 1).unwrap();
        let weeks = month.weeks(WeekStart::Monday);
        assert_eq!(weeks[0][0], date("2024-01-01"));

        let weeks = month.weeks(WeekStart::Sunday);
        assert_eq!(weeks[0][0], date("2023-12-31"));
        assert_eq!(weeks[0][0].weekday(), Weekday::Sun);
    }

    #[test]
    fn test_weeks_cover_every_day_of_month() {
        for m in 1..=12 {
            let month = CalendarMonth::new(2025, m).unwrap();
            for week_start in [WeekStart::Sunday, WeekStart::Monday] {
                let days: Vec<NaiveDate> = month.weeks(week_start).concat();
                assert_eq!(days.len(), 42);
                assert_eq!(days[0].weekday(), week_start.weekday());
                assert!(days.contains(&month.first_day()));
                assert!(days.contains(&month.last_day()));
            }
        }
    }

    #[test]
    fn test_week_start_headers() {
        assert_eq!(WeekStart::Sunday.headers()[0], "Sun");
        assert_eq!(WeekStart::Monday.headers()[6], "Sun");
        assert_eq!(WeekStart::default(), WeekStart::Sunday);
    }

    #[test]
    fn test_group_by_date() {
        let subs = vec![
            Subscription::new(
                "Netflix",
                Price::from_cents(1599, "$"),
                date("2024-01-15"),
                Frequency::Monthly,
            )
            .unwrap(),
            Subscription::new(
                "Spotify",
                Price::from_cents(999, "$"),
                date("2024-01-15"),
                Frequency::Monthly,
            )
            .unwrap(),
        ];
        let events = project_all(&subs).unwrap();
        let grouped = group_by_date(&events);

        assert_eq!(grouped.len(), 13);
        let first = &grouped[&date("2024-01-15")];
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].subscription.name(), "Netflix");
        assert_eq!(first[1].subscription.name(), "Spotify");

        let dates: Vec<&NaiveDate> = grouped.keys().collect();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }
}
