use crate::calendar::ViewPeriod;
use crate::collection::HabitCollection;
use crate::errors::AppError;
use crate::models::{day_map, new_habit_id, DaySet, Habit};
use chrono::Utc;
use serde::Deserialize;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{error, info};

pub const EXPORT_FILE_NAME: &str = "habits-export.json";

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/habits.json"))
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub async fn load_data(path: &Path) -> HabitCollection {
    let now_ms = now_millis();
    let view = ViewPeriod::current();

    let mut data = match fs::read(path).await {
        Ok(bytes) => match parse_state(&bytes, now_ms, view) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {}", err.message);
                HabitCollection::empty(view)
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => HabitCollection::empty(view),
        Err(err) => {
            error!("failed to read data file: {err}");
            HabitCollection::empty(view)
        }
    };

    if data.habits.is_empty() {
        info!("no habits stored, seeding presets");
        data.seed_presets(now_ms);
    }
    data.ensure_selection();
    data
}

pub async fn persist_data(path: &Path, data: &HabitCollection) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data)?;
    fs::write(path, payload).await?;
    Ok(())
}

pub fn export_json(data: &HabitCollection) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(data)?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    habits: Option<Vec<StoredHabit>>,
    #[serde(default)]
    selected_id: Option<String>,
    #[serde(default)]
    view_year: Option<i32>,
    #[serde(default)]
    view_month: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredHabit {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default, deserialize_with = "day_map::deserialize")]
    days: DaySet,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    updated_at: Option<i64>,
}

pub fn parse_state(bytes: &[u8], now_ms: i64, fallback_view: ViewPeriod) -> Result<HabitCollection, AppError> {
    let stored: StoredState = serde_json::from_slice(bytes)
        .map_err(|err| AppError::bad_request(format!("import failed: {err}")))?;
    let habits = stored
        .habits
        .ok_or_else(|| AppError::bad_request("invalid file format: missing habits array"))?;

    let view = match (stored.view_year, stored.view_month) {
        (Some(year), Some(month)) => ViewPeriod::new(year, month).unwrap_or(fallback_view),
        _ => fallback_view,
    };

    let mut data = HabitCollection::empty(view);
    data.selected_id = stored.selected_id;
    for habit in habits {
        let id = match habit.id {
            Some(id) if is_route_safe(&id) => id,
            original => {
                let id = new_habit_id();
                if original.is_some() && original == data.selected_id {
                    data.selected_id = Some(id.clone());
                }
                id
            }
        };
        data.habits.push(Habit {
            id,
            name: habit.name,
            days: habit.days,
            created_at: habit.created_at.unwrap_or(now_ms),
            updated_at: habit.updated_at,
        });
    }
    data.ensure_selection();
    Ok(data)
}

// Ids end up as a single path segment in page and API routes.
fn is_route_safe(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::NaiveDate;

    fn january() -> ViewPeriod {
        ViewPeriod::new(2024, 0).unwrap()
    }

    fn temp_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("habit_tracker_{tag}_{}_{nanos}.json", std::process::id()));
        path
    }

    #[test]
    fn parse_fills_missing_fields() {
        let raw = br#"{
            "habits": [
                { "name": "Read", "days": { "2024-01-02": true } },
                { "id": "", "name": "Run", "createdAt": 5 }
            ],
            "viewYear": 2023,
            "viewMonth": 99
        }"#;
        let data = parse_state(raw, 1_000, january()).unwrap();

        assert_eq!(data.habits.len(), 2);
        assert!(!data.habits[0].id.is_empty());
        assert!(!data.habits[1].id.is_empty());
        assert_ne!(data.habits[0].id, data.habits[1].id);
        assert_eq!(data.habits[0].created_at, 1_000);
        assert_eq!(data.habits[1].created_at, 5);
        assert!(data.habits[1].days.is_empty());
        assert_eq!(data.view(), january());
        assert_eq!(data.selected_id, Some(data.habits[0].id.clone()));
    }

    #[test]
    fn parse_keeps_view_and_valid_selection() {
        let raw = br#"{
            "habits": [
                { "id": "a", "name": "A", "createdAt": 1, "days": {} },
                { "id": "b", "name": "B", "createdAt": 2, "days": {} }
            ],
            "selectedId": "b",
            "viewYear": 2022,
            "viewMonth": 6
        }"#;
        let data = parse_state(raw, 0, january()).unwrap();
        assert_eq!(data.selected_id.as_deref(), Some("b"));
        assert_eq!(data.view(), ViewPeriod::new(2022, 6).unwrap());
    }

    #[test]
    fn parse_keeps_habits_with_non_bool_day_values() {
        let raw = br#"{
            "habits": [
                { "id": "keep", "name": "Keep", "createdAt": 1, "days": { "2024-01-02": 1, "2024-01-03": "yes" } },
                { "id": "other", "name": "Other", "createdAt": 2, "days": { "2024-01-04": true, "2024-01-05": null, "2024-01-06": false } }
            ]
        }"#;
        let data = parse_state(raw, 0, january()).unwrap();

        let keep = data.habit("keep").expect("habit with numeric day values");
        assert_eq!(
            keep.days,
            DaySet::from([
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            ])
        );
        let other = data.habit("other").unwrap();
        assert_eq!(other.days, DaySet::from([NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()]));
    }

    #[test]
    fn parse_replaces_ids_unfit_for_routes() {
        let raw = br#"{
            "habits": [
                { "id": "a/b?c", "name": "Slashed", "createdAt": 1 },
                { "id": "plain-id_1", "name": "Plain", "createdAt": 2 }
            ],
            "selectedId": "a/b?c"
        }"#;
        let data = parse_state(raw, 0, january()).unwrap();

        let slashed = &data.habits[0];
        assert_ne!(slashed.id, "a/b?c");
        assert!(is_route_safe(&slashed.id));
        assert_eq!(data.selected_id.as_deref(), Some(slashed.id.as_str()));
        assert_eq!(data.habits[1].id, "plain-id_1");
    }

    #[test]
    fn parse_rejects_missing_habits() {
        let err = parse_state(br#"{ "selectedId": null }"#, 0, january()).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("invalid file format"));

        let err = parse_state(b"not json", 0, january()).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn export_round_trips_habits() {
        let mut data = HabitCollection::seeded(11, january());
        let id = data.habits[1].id.clone();
        data.toggle_day(&id, NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(), 12);

        let exported = export_json(&data).unwrap();
        let restored = parse_state(exported.as_bytes(), 0, ViewPeriod::new(1999, 0).unwrap()).unwrap();
        assert_eq!(restored, data);
    }

    #[tokio::test]
    async fn load_missing_file_seeds_presets() {
        let data = load_data(&temp_path("missing")).await;
        assert_eq!(data.habits.len(), 4);
        assert!(data.selected().is_some());
    }

    #[tokio::test]
    async fn persist_then_load_keeps_state() {
        let path = temp_path("persist");
        let mut data = HabitCollection::empty(january());
        data.add_habit("Journal", 3);
        let id = data.habits[0].id.clone();
        data.toggle_day(&id, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 4);

        persist_data(&path, &data).await.unwrap();
        let loaded = load_data(&path).await;
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, data);
    }

    #[tokio::test]
    async fn load_keeps_valid_habits_beside_bad_day_entries() {
        let path = temp_path("lenient");
        std::fs::write(
            &path,
            br#"{
                "habits": [
                    { "id": "keep", "name": "Keep", "createdAt": 1, "days": { "2024-01-02": 1, "garbage": true } },
                    { "id": "fine", "name": "Fine", "createdAt": 2, "days": { "2024-01-03": true } }
                ],
                "selectedId": "keep",
                "viewYear": 2024,
                "viewMonth": 0
            }"#,
        )
        .unwrap();
        let data = load_data(&path).await;
        let _ = std::fs::remove_file(&path);

        let names: Vec<&str> = data.habits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Keep", "Fine"]);
        assert_eq!(data.habit("keep").unwrap().days.len(), 1);
        assert_eq!(data.habit("fine").unwrap().days.len(), 1);
        assert_eq!(data.selected_id.as_deref(), Some("keep"));
    }

    #[tokio::test]
    async fn load_corrupt_file_falls_back_to_presets() {
        let path = temp_path("corrupt");
        std::fs::write(&path, b"{ broken").unwrap();
        let data = load_data(&path).await;
        let _ = std::fs::remove_file(&path);
        assert_eq!(data.habits.len(), 4);
    }
}
