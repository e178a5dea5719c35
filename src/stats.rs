use crate::calendar::ViewPeriod;
use crate::models::{DateRange, DaySet, Habit, HabitStatsResponse, PeriodCompletion, StreakResult};
use chrono::{Duration, Local, NaiveDate};

const SPARK_DAYS: usize = 30;

pub fn compute_streaks(days: &DaySet, today: NaiveDate) -> StreakResult {
    // Only a strictly longer run replaces the best, so ties keep the earliest run.
    let best_range = runs(days).into_iter().fold(None, |best: Option<DateRange>, run| match best {
        Some(best) if best.day_count() >= run.day_count() => Some(best),
        _ => Some(run),
    });

    let mut current = 0u32;
    let mut start = today;
    let mut cursor = Some(today);
    while let Some(day) = cursor.filter(|day| days.contains(day)) {
        current += 1;
        start = day;
        cursor = day.pred_opt();
    }

    StreakResult {
        current,
        best: best_range.map_or(0, |range| range.day_count()),
        current_range: (current > 0).then_some(DateRange { start, end: today }),
        best_range,
    }
}

fn runs(days: &DaySet) -> Vec<DateRange> {
    let mut runs: Vec<DateRange> = Vec::new();
    for &day in days {
        match runs.last_mut() {
            Some(run) if run.end.succ_opt() == Some(day) => run.end = day,
            _ => runs.push(DateRange { start: day, end: day }),
        }
    }
    runs
}

pub fn period_completion(habit: &Habit, period: ViewPeriod) -> PeriodCompletion {
    let total_days = period.days_in_month();
    let completed_count = habit
        .days
        .range(period.first_day()..=period.last_day())
        .count() as u32;
    let percentage = (f64::from(completed_count) / f64::from(total_days) * 100.0).round() as u32;

    PeriodCompletion {
        completed_count,
        total_days,
        percentage,
    }
}

pub fn total_completions(habit: &Habit) -> usize {
    habit.days.len()
}

pub fn last_n_days(habit: &Habit, today: NaiveDate, n: usize) -> Vec<bool> {
    (0..n)
        .rev()
        .map(|offset| habit.is_completed(today - Duration::days(offset as i64)))
        .collect()
}

pub fn build_habit_stats(habit: &Habit, period: ViewPeriod) -> HabitStatsResponse {
    build_habit_stats_at(Local::now().date_naive(), habit, period)
}

pub fn build_habit_stats_at(today: NaiveDate, habit: &Habit, period: ViewPeriod) -> HabitStatsResponse {
    HabitStatsResponse {
        id: habit.id.clone(),
        name: habit.name.clone(),
        created_at: habit.created_at,
        year: period.year(),
        month: period.month(),
        month_completion: period_completion(habit, period),
        total_completions: total_completions(habit),
        streaks: compute_streaks(&habit.days, today),
        last_30_days: last_n_days(habit, today, SPARK_DAYS),
    }
}
