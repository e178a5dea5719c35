use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub type DaySet = BTreeSet<NaiveDate>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default, with = "day_map")]
    pub days: DaySet,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl Habit {
    pub fn new(name: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: new_habit_id(),
            name: name.into(),
            days: DaySet::new(),
            created_at,
            updated_at: None,
        }
    }

    pub fn is_completed(&self, date: NaiveDate) -> bool {
        self.days.contains(&date)
    }

    pub fn toggle(&mut self, date: NaiveDate, now_ms: i64) -> bool {
        let completed = if self.days.remove(&date) {
            false
        } else {
            self.days.insert(date);
            true
        };
        self.updated_at = Some(now_ms);
        completed
    }

    pub fn mark(&mut self, date: NaiveDate, now_ms: i64) {
        self.days.insert(date);
        self.updated_at = Some(now_ms);
    }

    pub fn clear_range(&mut self, first: NaiveDate, last: NaiveDate, now_ms: i64) -> usize {
        let before = self.days.len();
        self.days.retain(|day| *day < first || *day > last);
        self.updated_at = Some(now_ms);
        before - self.days.len()
    }
}

pub fn new_habit_id() -> String {
    Uuid::new_v4().to_string()
}

// Written as {"YYYY-MM-DD": true}. Read from that map, an array of dates or null.
pub mod day_map {
    use super::DaySet;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use std::collections::BTreeMap;
    use tracing::warn;

    pub fn serialize<S: Serializer>(days: &DaySet, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(days.iter().map(|day| (day.format("%Y-%m-%d").to_string(), true)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DaySet, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawDays {
            Map(BTreeMap<String, Value>),
            List(Vec<String>),
            Null(()),
        }

        let keys: Vec<String> = match RawDays::deserialize(deserializer)? {
            RawDays::Map(map) => map
                .into_iter()
                .filter(|(_, done)| !matches!(done, Value::Bool(false) | Value::Null))
                .map(|(key, _)| key)
                .collect(),
            RawDays::List(list) => list,
            RawDays::Null(()) => Vec::new(),
        };

        Ok(keys
            .into_iter()
            .filter_map(|key| match NaiveDate::parse_from_str(&key, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(err) => {
                    warn!("dropping malformed completion date '{key}': {err}");
                    None
                }
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn day_count(&self) -> u32 {
        (self.end - self.start).num_days() as u32 + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct StreakResult {
    pub current: u32,
    pub best: u32,
    pub current_range: Option<DateRange>,
    pub best_range: Option<DateRange>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PeriodCompletion {
    pub completed_count: u32,
    pub total_days: u32,
    pub percentage: u32,
}

#[derive(Debug, Serialize)]
pub struct HabitStatsResponse {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    pub year: i32,
    pub month: u32,
    pub month_completion: PeriodCompletion,
    pub total_completions: usize,
    pub streaks: StreakResult,
    pub last_30_days: Vec<bool>,
}

#[derive(Debug, Serialize)]
pub struct HabitSummary {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    pub total_completions: usize,
}

impl From<&Habit> for HabitSummary {
    fn from(habit: &Habit) -> Self {
        Self {
            id: habit.id.clone(),
            name: habit.name.clone(),
            created_at: habit.created_at,
            updated_at: habit.updated_at,
            total_completions: habit.days.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub year: i32,
    pub month: u32,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct HabitListResponse {
    pub habits: Vec<HabitSummary>,
    pub selected_id: Option<String>,
    pub view: ViewResponse,
}

#[derive(Debug, Deserialize)]
pub struct NewHabitRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub id: String,
    pub date: NaiveDate,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct ClearMonthResponse {
    pub id: String,
    pub year: i32,
    pub month: u32,
    pub removed: usize,
}

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Deserialize, Default)]
pub struct PeriodQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CalendarQuery {
    pub habit: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}
