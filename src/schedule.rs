//! Session-relative alert schedule
//!
//! The session start is defined as a wall-clock time in the session's own
//! timezone, so triggers follow daylight-saving changes there. Two triggers
//! fire per day: one before the start and one after it.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which of the two daily jobs a trigger runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    PreSession,
    PostOpen,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::PreSession => "pre_session",
            AlertKind::PostOpen => "post_open",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub kind: AlertKind,
    pub at: DateTime<Utc>,
}

/// Daily pre/post alerts around a named market session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSchedule {
    /// Display name, e.g. `NY`
    pub name: String,
    pub timezone: Tz,
    /// Session open, local to `timezone`
    pub start: NaiveTime,
    pub pre_alert_minutes: u32,
    pub post_alert_minutes: u32,
    /// Skip Saturdays and Sundays (local to `timezone`)
    pub weekdays_only: bool,
}

impl Default for SessionSchedule {
    /// New York open at 08:00 local, alerts five minutes either side
    fn default() -> Self {
        Self {
            name: "NY".to_string(),
            timezone: chrono_tz::America::New_York,
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            pre_alert_minutes: 5,
            post_alert_minutes: 5,
            weekdays_only: false,
        }
    }
}

impl SessionSchedule {
    const MAX_OFFSET_MINUTES: u32 = 12 * 60;

    pub fn validate(&self) -> Result<()> {
        for (field, minutes) in [
            ("pre_alert_minutes", self.pre_alert_minutes),
            ("post_alert_minutes", self.post_alert_minutes),
        ] {
            if minutes > Self::MAX_OFFSET_MINUTES {
                return Err(Error::OutOfRange {
                    field,
                    value: minutes as f64,
                    min: 0.0,
                    max: Self::MAX_OFFSET_MINUTES as f64,
                });
            }
        }
        Ok(())
    }

    /// Session open on `date` in UTC. `None` when the local time falls in a
    /// DST gap; an ambiguous local time resolves to the earlier instant.
    pub fn session_start_on(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.timezone
            .from_local_datetime(&date.and_time(self.start))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Both triggers for a local calendar day, pre-session first
    pub fn triggers_on(&self, date: NaiveDate) -> Vec<Trigger> {
        if self.weekdays_only && matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return Vec::new();
        }
        let Some(start) = self.session_start_on(date) else {
            return Vec::new();
        };
        vec![
            Trigger {
                kind: AlertKind::PreSession,
                at: start - Duration::minutes(self.pre_alert_minutes as i64),
            },
            Trigger {
                kind: AlertKind::PostOpen,
                at: start + Duration::minutes(self.post_alert_minutes as i64),
            },
        ]
    }

    /// First trigger strictly after `after`
    pub fn next_trigger(&self, after: DateTime<Utc>) -> Option<Trigger> {
        let today = self.local_time(after).date_naive();
        (-1..=8)
            .filter_map(|offset| today.checked_add_signed(Duration::days(offset)))
            .flat_map(|date| self.triggers_on(date))
            .filter(|t| t.at > after)
            .min_by_key(|t| t.at)
    }

    pub fn local_time(&self, at: DateTime<Utc>) -> DateTime<Tz> {
        at.with_timezone(&self.timezone)
    }
}
