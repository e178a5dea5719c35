use crate::calendar::ViewPeriod;
use crate::models::{Habit, HabitListResponse, HabitSummary, ViewResponse};
use chrono::NaiveDate;
use serde::Serialize;

pub const PRESET_HABITS: [&str; 4] = ["Drink Water", "Study Hours", "Gym", "Sleep Time"];

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HabitCollection {
    pub habits: Vec<Habit>,
    pub selected_id: Option<String>,
    pub view_year: i32,
    pub view_month: u32,
}

impl HabitCollection {
    pub fn empty(view: ViewPeriod) -> Self {
        Self {
            habits: Vec::new(),
            selected_id: None,
            view_year: view.year(),
            view_month: view.month(),
        }
    }

    pub fn seeded(now_ms: i64, view: ViewPeriod) -> Self {
        let mut collection = Self::empty(view);
        collection.seed_presets(now_ms);
        collection
    }

    pub fn seed_presets(&mut self, now_ms: i64) {
        self.habits = PRESET_HABITS
            .iter()
            .map(|name| Habit::new(*name, now_ms))
            .collect();
        self.selected_id = self.habits.first().map(|habit| habit.id.clone());
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn habit_mut(&mut self, id: &str) -> Option<&mut Habit> {
        self.habits.iter_mut().find(|habit| habit.id == id)
    }

    pub fn selected(&self) -> Option<&Habit> {
        self.selected_id.as_deref().and_then(|id| self.habit(id))
    }

    pub fn ensure_selection(&mut self) {
        if self.selected().is_none() {
            self.selected_id = self.habits.first().map(|habit| habit.id.clone());
        }
    }

    pub fn select(&mut self, id: &str) -> bool {
        if self.habit(id).is_none() {
            return false;
        }
        self.selected_id = Some(id.to_string());
        true
    }

    pub fn add_habit(&mut self, name: &str, now_ms: i64) -> Option<&Habit> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let habit = Habit::new(name, now_ms);
        self.selected_id = Some(habit.id.clone());
        self.habits.insert(0, habit);
        self.habits.first()
    }

    pub fn remove_habit(&mut self, id: &str) -> Option<Habit> {
        let index = self.habits.iter().position(|habit| habit.id == id)?;
        let removed = self.habits.remove(index);
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = self.habits.first().map(|habit| habit.id.clone());
        }
        Some(removed)
    }

    pub fn toggle_day(&mut self, id: &str, date: NaiveDate, now_ms: i64) -> Option<bool> {
        self.habit_mut(id).map(|habit| habit.toggle(date, now_ms))
    }

    pub fn mark_today(&mut self, id: &str, today: NaiveDate, now_ms: i64) -> bool {
        match self.habit_mut(id) {
            Some(habit) => {
                habit.mark(today, now_ms);
                true
            }
            None => false,
        }
    }

    pub fn clear_month(&mut self, id: &str, now_ms: i64) -> Option<usize> {
        let view = self.view();
        self.habit_mut(id)
            .map(|habit| habit.clear_range(view.first_day(), view.last_day(), now_ms))
    }

    pub fn clear(&mut self) {
        self.habits.clear();
        self.selected_id = None;
    }

    pub fn view(&self) -> ViewPeriod {
        ViewPeriod::new(self.view_year, self.view_month).unwrap_or_else(ViewPeriod::current)
    }

    pub fn set_view(&mut self, period: ViewPeriod) {
        self.view_year = period.year();
        self.view_month = period.month();
    }

    pub fn show_previous_month(&mut self) -> ViewPeriod {
        let period = self.view().previous();
        self.set_view(period);
        period
    }

    pub fn show_next_month(&mut self) -> ViewPeriod {
        let period = self.view().next();
        self.set_view(period);
        period
    }

    pub fn listing(&self) -> HabitListResponse {
        HabitListResponse {
            habits: self.habits.iter().map(HabitSummary::from).collect(),
            selected_id: self.selected().map(|habit| habit.id.clone()),
            view: view_response(self.view()),
        }
    }
}

pub fn view_response(period: ViewPeriod) -> ViewResponse {
    ViewResponse {
        year: period.year(),
        month: period.month(),
        label: period.label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn january() -> ViewPeriod {
        ViewPeriod::new(2024, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn seeded_collection_selects_first_preset() {
        let collection = HabitCollection::seeded(7, january());
        let names: Vec<&str> = collection.habits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, PRESET_HABITS);
        assert_eq!(collection.selected().map(|h| h.name.as_str()), Some("Drink Water"));
        assert!(collection.habits.iter().all(|h| h.created_at == 7));
    }

    #[test]
    fn add_habit_inserts_first_and_selects() {
        let mut collection = HabitCollection::seeded(0, january());
        let id = collection.add_habit("  Meditate ", 5).unwrap().id.clone();
        assert_eq!(collection.habits[0].name, "Meditate");
        assert_eq!(collection.selected_id.as_deref(), Some(id.as_str()));
        assert!(collection.add_habit("   ", 6).is_none());
        assert_eq!(collection.habits.len(), 5);
    }

    #[test]
    fn removing_selected_habit_moves_selection_to_first() {
        let mut collection = HabitCollection::seeded(0, january());
        let second = collection.habits[1].id.clone();
        let first = collection.habits[0].id.clone();
        assert!(collection.select(&second));

        assert!(collection.remove_habit(&second).is_some());
        assert_eq!(collection.selected_id.as_deref(), Some(first.as_str()));
        assert!(collection.remove_habit(&second).is_none());

        collection.clear();
        assert!(collection.selected().is_none());
        assert!(collection.remove_habit(&first).is_none());
    }

    #[test]
    fn stale_selection_is_revalidated() {
        let mut collection = HabitCollection::seeded(0, january());
        collection.selected_id = Some("gone".into());
        assert!(collection.selected().is_none());
        assert!(!collection.select("also-gone"));
        collection.ensure_selection();
        assert_eq!(collection.selected_id, Some(collection.habits[0].id.clone()));
    }

    #[test]
    fn toggle_and_mark_today_touch_only_their_habit() {
        let mut collection = HabitCollection::seeded(0, january());
        let id = collection.habits[2].id.clone();

        assert_eq!(collection.toggle_day(&id, date(2024, 1, 3), 1), Some(true));
        assert!(collection.mark_today(&id, date(2024, 1, 4), 2));
        assert!(collection.mark_today(&id, date(2024, 1, 4), 3));
        assert_eq!(collection.toggle_day("missing", date(2024, 1, 3), 1), None);
        assert!(!collection.mark_today("missing", date(2024, 1, 3), 1));

        assert_eq!(collection.habit(&id).unwrap().days.len(), 2);
        assert_eq!(collection.habit(&id).unwrap().updated_at, Some(3));
        assert_eq!(collection.habits.iter().map(|h| h.days.len()).sum::<usize>(), 2);
    }

    #[test]
    fn clear_month_uses_view_period() {
        let mut collection = HabitCollection::seeded(0, january());
        let id = collection.habits[0].id.clone();
        for d in [date(2023, 12, 31), date(2024, 1, 1), date(2024, 1, 31), date(2024, 2, 1)] {
            collection.toggle_day(&id, d, 0);
        }
        assert_eq!(collection.clear_month(&id, 1), Some(2));
        assert_eq!(collection.habit(&id).unwrap().days.len(), 2);
        assert_eq!(collection.clear_month("missing", 1), None);
    }

    #[test]
    fn month_navigation_updates_view() {
        let mut collection = HabitCollection::empty(january());
        let previous = collection.show_previous_month();
        assert_eq!((previous.year(), previous.month()), (2023, 11));
        assert_eq!((collection.view_year, collection.view_month), (2023, 11));
        collection.show_next_month();
        collection.show_next_month();
        assert_eq!(collection.view(), ViewPeriod::new(2024, 1).unwrap());
    }

    #[test]
    fn listing_reports_counts_and_view() {
        let mut collection = HabitCollection::seeded(0, january());
        let id = collection.habits[0].id.clone();
        collection.toggle_day(&id, date(2024, 1, 1), 0);
        let listing = collection.listing();
        assert_eq!(listing.habits.len(), 4);
        assert_eq!(listing.habits[0].total_completions, 1);
        assert_eq!(listing.selected_id, Some(id));
        assert_eq!(listing.view.label, "January 2024");
    }
}
