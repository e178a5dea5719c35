use crate::models::Habit;
use crate::stats::compute_streaks;
use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ViewPeriod {
    first: NaiveDate,
}

impl ViewPeriod {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if month > 11 {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month + 1, 1).map(|first| Self { first })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date - Duration::days(i64::from(date.day0())),
        }
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn year(self) -> i32 {
        self.first.year()
    }

    pub fn month(self) -> u32 {
        self.first.month0()
    }

    pub fn first_day(self) -> NaiveDate {
        self.first
    }

    pub fn last_day(self) -> NaiveDate {
        self.first + Duration::days(i64::from(self.days_in_month()) - 1)
    }

    pub fn days_in_month(self) -> u32 {
        match self.first.month() {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            _ if is_leap_year(self.year()) => 29,
            _ => 28,
        }
    }

    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        self.first.iter_days().take(self.days_in_month() as usize)
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.first && date <= self.last_day()
    }

    pub fn previous(self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map_or(self, |first| Self { first })
    }

    pub fn next(self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map_or(self, |first| Self { first })
    }

    pub fn label(self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub day: u32,
    pub weekday: String,
    pub completed: bool,
    pub in_current_streak: bool,
    pub is_today: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarGrid {
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub habit_id: Option<String>,
    pub leading_blanks: u32,
    pub trailing_blanks: u32,
    pub weeks: u32,
    pub cells: Vec<CalendarCell>,
}

pub fn month_grid(period: ViewPeriod, habit: Option<&Habit>, today: NaiveDate) -> CalendarGrid {
    let leading_blanks = period.first_day().weekday().num_days_from_sunday();
    let filled = leading_blanks + period.days_in_month();
    let weeks = filled.div_ceil(7);
    let trailing_blanks = weeks * 7 - filled;

    let current_range = habit.and_then(|habit| compute_streaks(&habit.days, today).current_range);

    let cells = period
        .days()
        .map(|date| CalendarCell {
            date,
            day: date.day(),
            weekday: date.format("%a").to_string(),
            completed: habit.is_some_and(|habit| habit.is_completed(date)),
            in_current_streak: current_range.is_some_and(|range| range.contains(date)),
            is_today: date == today,
        })
        .collect();

    CalendarGrid {
        label: period.label(),
        year: period.year(),
        month: period.month(),
        habit_id: habit.map(|habit| habit.id.clone()),
        leading_blanks,
        trailing_blanks,
        weeks,
        cells,
    }
}
