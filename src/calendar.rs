//! Working-day calendar for a payroll month.
//!
//! A date is a working day iff it is neither a Saturday/Sunday nor listed as a
//! holiday. Holidays are exact dates, each year has to be supplied in full.

use std::collections::BTreeMap;

use chrono::{Datelike as _, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// A calendar month, always a valid year/month pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "RawPeriod", try_from = "RawPeriod")]
pub struct Period {
    first: NaiveDate,
    last: NaiveDate,
}

#[derive(Serialize, Deserialize)]
struct RawPeriod {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        let invalid = CalendarError::InvalidPeriod { year, month };

        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(invalid.clone())?;
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or(invalid)?;

        Ok(Self { first, last })
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
        self.last
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let last = self.last;
        self.first.iter_days().take_while(move |date| *date <= last)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl From<Period> for RawPeriod {
    fn from(period: Period) -> Self {
        Self {
            year: period.year(),
            month: period.month(),
        }
    }
}

impl TryFrom<RawPeriod> for Period {
    type Error = CalendarError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        Period::new(raw.year, raw.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayType {
    National,
    Regional,
    Company,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: HolidayType,
    pub is_paid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayKind {
    Workday,
    Weekend,
    Holiday(Holiday),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub kind: DayKind,
}

impl CalendarDay {
    pub fn is_working_day(&self) -> bool {
        matches!(self.kind, DayKind::Workday)
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Weekend and holiday aware calendar. Company holidays are excluded from working
/// days the same way national ones are, [`WorkingCalendar::day`] exposes the type.
#[derive(Debug, Clone, Default)]
pub struct WorkingCalendar {
    holidays: BTreeMap<NaiveDate, Holiday>,
}

impl WorkingCalendar {
    pub fn new(holidays: impl IntoIterator<Item = Holiday>) -> Self {
        Self {
            holidays: holidays.into_iter().map(|holiday| (holiday.date, holiday)).collect(),
        }
    }

    pub fn holiday(&self, date: NaiveDate) -> Option<&Holiday> {
        self.holidays.get(&date)
    }

    pub fn holidays_in(&self, period: Period) -> impl Iterator<Item = &Holiday> {
        self.holidays.range(period.first_day()..=period.last_day()).map(|(_, holiday)| holiday)
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.holidays.contains_key(&date)
    }

    pub fn day(&self, date: NaiveDate) -> CalendarDay {
        // Holidays win over weekends so a Saturday holiday still reports its name
        let kind = match self.holiday(date) {
            Some(holiday) => DayKind::Holiday(holiday.clone()),
            None if is_weekend(date) => DayKind::Weekend,
            None => DayKind::Workday,
        };

        CalendarDay { date, kind }
    }

    pub fn working_dates(&self, period: Period) -> impl Iterator<Item = NaiveDate> + '_ {
        period.dates().filter(move |date| self.is_working_day(*date))
    }

    pub fn working_dates_in_month(&self, year: i32, month: u32) -> Result<impl Iterator<Item = NaiveDate> + '_, CalendarError> {
        Ok(self.working_dates(Period::new(year, month)?))
    }

    pub fn working_days(&self, period: Period) -> u32 {
        self.working_dates(period).count() as u32
    }

    pub fn working_days_in_month(&self, year: i32, month: u32) -> Result<u32, CalendarError> {
        Ok(self.working_days(Period::new(year, month)?))
    }

    pub fn month(&self, period: Period) -> Vec<CalendarDay> {
        period.dates().map(|date| self.day(date)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn holiday(date: NaiveDate, name: &str, kind: HolidayType) -> Holiday {
        Holiday {
            date,
            name: name.to_string(),
            kind,
            is_paid: true,
        }
    }

    fn calendar_2025() -> WorkingCalendar {
        WorkingCalendar::new([
            holiday(date(2025, 3, 31), "Idul Fitri", HolidayType::National),
            holiday(date(2025, 4, 1), "Idul Fitri", HolidayType::National),
            holiday(date(2025, 4, 2), "Cuti Bersama Idul Fitri", HolidayType::National),
            holiday(date(2025, 4, 3), "Cuti Bersama Idul Fitri", HolidayType::National),
            holiday(date(2025, 4, 4), "Cuti Bersama Idul Fitri", HolidayType::National),
            holiday(date(2025, 4, 18), "Wafat Isa Almasih", HolidayType::National),
            holiday(date(2025, 5, 2), "Company Anniversary", HolidayType::Company),
        ])
    }

    #[test]
    fn test_period() {
        let period = Period::new(2024, 2).unwrap();

        assert_eq!(period.first_day(), date(2024, 2, 1));
        assert_eq!(period.last_day(), date(2024, 2, 29));
        assert_eq!(period.dates().count(), 29);
        assert_eq!(period.to_string(), "2024-02");

        assert_eq!(Period::new(2025, 13), Err(CalendarError::InvalidPeriod { year: 2025, month: 13 }));
        assert_eq!(Period::new(2025, 0), Err(CalendarError::InvalidPeriod { year: 2025, month: 0 }));
    }

    #[test]
    fn test_period_serde() {
        let period: Period = serde_json::from_str(r#"{"year":2025,"month":4}"#).unwrap();
        assert_eq!(period, Period::new(2025, 4).unwrap());
        assert_eq!(serde_json::to_string(&period).unwrap(), r#"{"year":2025,"month":4}"#);

        assert!(serde_json::from_str::<Period>(r#"{"year":2025,"month":13}"#).is_err());
    }

    #[test]
    fn test_count_working_days() {
        let calendar = WorkingCalendar::default();

        assert_eq!(calendar.working_days_in_month(2024, 6).unwrap(), 20);
    }

    #[test]
    fn test_april_2025_excludes_holidays() {
        let calendar = calendar_2025();

        assert_eq!(calendar.working_days_in_month(2025, 4).unwrap(), 17);
        assert_eq!(calendar.working_days_in_month(2025, 3).unwrap(), 20);

        let dates = calendar.working_dates_in_month(2025, 4).unwrap().collect::<Vec<_>>();
        assert_eq!(dates.first(), Some(&date(2025, 4, 7)));
        assert!(!dates.contains(&date(2025, 4, 18)));
    }

    #[test]
    fn test_working_dates_match_count() {
        let calendar = calendar_2025();

        for month in 1..=12 {
            let period = Period::new(2025, month).unwrap();
            let dates = calendar.working_dates(period).collect::<Vec<_>>();

            assert_eq!(dates.len() as u32, calendar.working_days(period));
            assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
            for date in dates {
                assert!(!is_weekend(date));
                assert!(calendar.holiday(date).is_none());
            }
        }
    }

    #[test]
    fn test_company_holiday() {
        let calendar = calendar_2025();

        assert!(!calendar.is_working_day(date(2025, 5, 2)));
        match calendar.day(date(2025, 5, 2)).kind {
            DayKind::Holiday(holiday) => assert_eq!(holiday.kind, HolidayType::Company),
            other => panic!("expected a holiday, got {other:?}"),
        }

        assert_eq!(calendar.day(date(2025, 5, 3)).kind, DayKind::Weekend);
        assert_eq!(calendar.day(date(2025, 5, 5)).kind, DayKind::Workday);
    }

    #[test]
    fn test_invalid_month() {
        let calendar = calendar_2025();

        assert!(calendar.working_days_in_month(2025, 0).is_err());
        assert!(calendar.working_dates_in_month(2025, 13).is_err());
    }

    #[test]
    fn test_holidays_in() {
        let calendar = calendar_2025();
        let period = Period::new(2025, 4).unwrap();

        assert_eq!(calendar.holidays_in(period).count(), 5);
    }
}
