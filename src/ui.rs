use crate::calendar::{month_grid, CalendarGrid};
use crate::collection::HabitCollection;
use crate::models::Habit;
use crate::stats::build_habit_stats_at;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt::Write;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn render_index(data: &HabitCollection, today: NaiveDate) -> String {
    let selected = data.selected();
    let view = data.view();
    let grid = month_grid(view, selected, today);

    INDEX_HTML
        .replace("{{HABIT_COUNT}}", &data.habits.len().to_string())
        .replace("{{HABITS}}", &render_habit_list(data))
        .replace("{{MONTH_LABEL}}", &escape_html(&grid.label))
        .replace("{{CALENDAR}}", &render_calendar(&grid, selected))
        .replace("{{STATS}}", &render_stats(data, selected, today))
}

fn render_habit_list(data: &HabitCollection) -> String {
    let selected_id = data.selected().map(|habit| habit.id.as_str());
    let mut html = String::new();
    for habit in &data.habits {
        let id = escape_html(&habit.id);
        let class = if Some(habit.id.as_str()) == selected_id {
            "habit-item active"
        } else {
            "habit-item"
        };
        let _ = write!(
            html,
            r#"<li class="{class}">
  <form method="post" action="/habits/{id}/select"><button class="link">{name}</button></form>
  <span class="count">{count} &#10003;</span>
  <form method="post" action="/habits/{id}/delete"><button class="danger" title="Delete habit">&times;</button></form>
</li>
"#,
            name = escape_html(&habit.name),
            count = habit.days.len(),
        );
    }
    html
}

fn render_calendar(grid: &CalendarGrid, habit: Option<&Habit>) -> String {
    let mut html = String::new();
    for weekday in WEEKDAYS {
        let _ = write!(html, r#"<div class="weekday">{weekday}</div>"#);
    }
    for _ in 0..grid.leading_blanks {
        html.push_str(r#"<div class="day disabled"></div>"#);
    }
    for cell in &grid.cells {
        let mut class = String::from("day");
        if cell.completed {
            class.push_str(" completed");
        }
        if cell.in_current_streak {
            class.push_str(" streak");
        }
        if cell.is_today {
            class.push_str(" today");
        }
        match habit {
            Some(habit) => {
                let _ = write!(
                    html,
                    r#"<form class="{class}" method="post" action="/habits/{id}/toggle/{date}"><button>{day}</button></form>"#,
                    id = escape_html(&habit.id),
                    date = cell.date,
                    day = cell.day,
                );
            }
            None => {
                let _ = write!(html, r#"<div class="{class}">{}</div>"#, cell.day);
            }
        }
    }
    for _ in 0..grid.trailing_blanks {
        html.push_str(r#"<div class="day disabled"></div>"#);
    }
    html
}

fn render_stats(data: &HabitCollection, habit: Option<&Habit>, today: NaiveDate) -> String {
    let Some(habit) = habit else {
        return r#"<h2>Select a habit</h2><p class="muted">Nothing selected.</p>"#.to_string();
    };

    let stats = build_habit_stats_at(today, habit, data.view());
    let created = DateTime::<Utc>::from_timestamp_millis(habit.created_at)
        .map(|at| at.date_naive().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let spark: String = stats
        .last_30_days
        .iter()
        .map(|done| if *done { "&#9679;" } else { "&#183;" })
        .collect();
    let id = escape_html(&habit.id);

    format!(
        r#"<h2>{name}</h2>
<p class="muted">Created {created}</p>
<div class="panel">
  <div class="stat"><span class="label">This month</span><span class="value">{pct}%</span></div>
  <div class="stat"><span class="label">Current streak</span><span class="value">{current}</span></div>
  <div class="stat"><span class="label">Best streak</span><span class="value">{best}</span></div>
  <div class="stat"><span class="label">Total</span><span class="value">{total}</span></div>
</div>
<p class="spark" title="Last 30 days">{spark}</p>
<div class="actions">
  <form method="post" action="/habits/{id}/today"><button>Mark today</button></form>
  <form method="post" action="/habits/{id}/clear-month"><button class="secondary">Clear month</button></form>
</div>"#,
        name = escape_html(&habit.name),
        pct = stats.month_completion.percentage,
        current = stats.streaks.current,
        best = stats.streaks.best,
        total = stats.total_completions,
    )
}

pub fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Tracker</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 32px 18px;
    }

    .app {
      width: min(980px, 100%);
      margin: 0 auto;
      display: grid;
      grid-template-columns: 280px 1fr;
      gap: 24px;
    }

    .card {
      background: var(--card);
      border-radius: 20px;
      padding: 24px;
      box-shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    ul { list-style: none; padding: 0; margin: 0; display: grid; gap: 8px; }
    form { margin: 0; display: inline; }
    button { cursor: pointer; border: none; border-radius: 999px; padding: 8px 14px; background: var(--accent); color: white; font-weight: 600; }
    button.link { background: none; color: var(--ink); padding: 0; text-align: left; }
    button.secondary { background: var(--accent-2); }
    button.danger { background: transparent; color: #b33; padding: 0 6px; }

    .habit-item { display: flex; align-items: center; gap: 8px; padding: 8px 10px; border-radius: 12px; }
    .habit-item.active { background: white; }
    .habit-item .count { margin-left: auto; color: #8b857d; font-size: 0.85rem; }

    .nav { display: flex; align-items: center; justify-content: space-between; margin-bottom: 12px; }
    .calendar { display: grid; grid-template-columns: repeat(7, 1fr); gap: 6px; }
    .weekday { text-align: center; font-size: 0.8rem; color: #8b857d; }
    .day { display: block; min-height: 44px; border-radius: 10px; background: white; text-align: center; }
    .day button { width: 100%; height: 44px; background: none; color: var(--ink); border-radius: 10px; }
    .day.disabled { background: transparent; }
    .day.completed button, div.day.completed { background: var(--accent); color: white; }
    .day.streak { box-shadow: 0 0 0 2px var(--accent-2); }
    .day.today { outline: 2px dashed var(--accent-2); }

    .panel { display: grid; grid-template-columns: repeat(4, 1fr); gap: 12px; margin: 16px 0; }
    .stat { background: white; border-radius: 14px; padding: 12px; display: grid; gap: 4px; }
    .stat .label { font-size: 0.75rem; text-transform: uppercase; letter-spacing: 0.1em; color: #8b857d; }
    .stat .value { font-size: 1.5rem; font-weight: 600; color: var(--accent-2); }
    .spark { letter-spacing: 2px; color: var(--accent); }
    .muted { color: #8b857d; }
    .actions { display: flex; gap: 12px; }
  </style>
</head>
<body>
  <main class="app">
    <section class="card">
      <h1>Habits ({{HABIT_COUNT}})</h1>
      <form method="post" action="/habits">
        <input name="name" placeholder="New habit" required />
        <button>Add</button>
      </form>
      <ul>
{{HABITS}}
      </ul>
    </section>
    <section class="card">
      <div class="nav">
        <form method="post" action="/view/prev"><button class="secondary">&larr;</button></form>
        <strong>{{MONTH_LABEL}}</strong>
        <form method="post" action="/view/next"><button class="secondary">&rarr;</button></form>
      </div>
      <div class="calendar">
{{CALENDAR}}
      </div>
      {{STATS}}
    </section>
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::ViewPeriod;

    #[test]
    fn escape_html_neutralises_markup() {
        assert_eq!(escape_html(r#"<b>"Tea" & toast</b>"#), "&lt;b&gt;&quot;Tea&quot; &amp; toast&lt;/b&gt;");
    }

    #[test]
    fn index_lists_habits_and_toggle_forms() {
        let mut data = HabitCollection::empty(ViewPeriod::new(2024, 0).unwrap());
        data.add_habit("<Run>", 0);
        let id = data.habits[0].id.clone();
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        data.mark_today(&id, today, 1);

        let html = render_index(&data, today);
        assert!(html.contains("&lt;Run&gt;"));
        assert!(!html.contains("<Run>"));
        assert!(html.contains("January 2024"));
        assert!(html.contains(&format!("/habits/{id}/toggle/2024-01-31")));
        assert!(html.contains("day completed streak today"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn index_without_selection_prompts_to_select() {
        let data = HabitCollection::empty(ViewPeriod::new(2024, 0).unwrap());
        let html = render_index(&data, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert!(html.contains("Select a habit"));
        assert!(!html.contains("/toggle/"));
    }
}
