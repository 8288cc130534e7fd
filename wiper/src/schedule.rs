//! Calendar math for wipe days
//!
//! Every server wipes on offsets from an anchor day: the first Thursday of the
//! month, which is also the day the game publishes its monthly update and every
//! server is force wiped. Resolution is a pure function of the current instant,
//! the server timezone and its wipe-day table so it can be tested without a clock.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;

use crate::config::WipeDay;

/// What kind of day `current_date` is for one server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WipeDecision {
    pub anchor_date: NaiveDate,
    pub current_date: NaiveDate,
    pub days_since_anchor: i64,
    pub is_anchor_day: bool,
    pub is_blueprint_wipe: bool,
    pub matched_rules: Vec<WipeDay>,
}

impl WipeDecision {
    /// At least one wipe-table entry matched today
    pub fn is_wipe_day(&self) -> bool {
        !self.matched_rules.is_empty()
    }

    /// The server wipes today and today is the anchor day
    pub fn is_force_wipe_day(&self) -> bool {
        self.is_anchor_day && self.is_wipe_day()
    }
}

/// Calendar date of `now` in `tz`
pub fn today_in(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// First Thursday of the month containing `date`
pub fn first_thursday(date: NaiveDate) -> NaiveDate {
    let first_of_month = date - Duration::days(i64::from(date.day0()));
    let offset = (7 + Weekday::Thu.num_days_from_monday()
        - first_of_month.weekday().num_days_from_monday())
        % 7;
    first_of_month + Duration::days(i64::from(offset))
}

/// Most recent anchor day at or before `today`
pub fn anchor_for(today: NaiveDate) -> NaiveDate {
    let anchor = first_thursday(today);
    if today < anchor {
        // Still in the first week: the previous month's anchor applies
        first_thursday(today - Duration::days(7))
    } else {
        anchor
    }
}

/// Resolve the decision for `now` as seen from `tz`
pub fn resolve(now: DateTime<Utc>, tz: Tz, wipe_table: &[WipeDay]) -> WipeDecision {
    resolve_date(today_in(now, tz), wipe_table)
}

/// Resolve the decision for a calendar date
pub fn resolve_date(today: NaiveDate, wipe_table: &[WipeDay]) -> WipeDecision {
    let anchor_date = anchor_for(today);
    let days_since_anchor = (today - anchor_date).num_days();

    let matched_rules: Vec<WipeDay> = wipe_table
        .iter()
        .filter(|day| day.days_since_force_wipe == days_since_anchor)
        .cloned()
        .collect();

    WipeDecision {
        anchor_date,
        current_date: today,
        days_since_anchor,
        is_anchor_day: anchor_date == today,
        is_blueprint_wipe: matched_rules.iter().any(|day| day.blueprint_wipe),
        matched_rules,
    }
}
