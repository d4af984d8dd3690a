//! Resource identifiers, snapshots, and the JSON shapes of the events resource.
//!
//! Boundaries keep the remote representation verbatim (`dateTime` vs `date`
//! plus an optional `timeZone` label) so a shifted boundary can be written
//! back in exactly the form it was read.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta};
use serde::{Deserialize, Serialize};

/// Title used when the remote event has no summary.
pub const UNTITLED_EVENT: &str = "Untitled Event";

const DATE_FORMAT: &str = "%Y-%m-%d";
const LOCAL_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Opaque identifier of one remote event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        ResourceId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::new(id)
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId(id)
    }
}

/// One start or end boundary, as the events resource represents it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBoundary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// A boundary that could not be parsed into an instant or a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTime;

impl EventBoundary {
    pub fn date_time(value: &str, time_zone: Option<&str>) -> Self {
        EventBoundary {
            date_time: Some(value.to_string()),
            date: None,
            time_zone: time_zone.map(str::to_string),
        }
    }

    pub fn all_day(date: &str) -> Self {
        EventBoundary {
            date_time: None,
            date: Some(date.to_string()),
            time_zone: None,
        }
    }

    pub fn is_all_day(&self) -> bool {
        self.date_time.is_none() && self.date.is_some()
    }

    /// Shift this boundary by `minutes`, keeping its representation kind and
    /// time zone label.
    ///
    /// A `dateTime` with an offset keeps that offset (and a trailing `Z` stays
    /// `Z`); a `dateTime` without an offset is shifted as local wall time. A
    /// whole-day `date` moves by `minutes / 1440` days, truncated toward zero,
    /// so shifting by `minutes` and then `-minutes` always lands on the
    /// original date.
    pub fn shifted_by(&self, minutes: i64) -> Result<EventBoundary, InvalidTime> {
        let delta = TimeDelta::try_minutes(minutes).ok_or(InvalidTime)?;

        if let Some(raw) = &self.date_time {
            let date_time = shift_date_time(raw, delta)?;
            return Ok(EventBoundary {
                date_time: Some(date_time),
                date: None,
                time_zone: self.time_zone.clone(),
            });
        }

        if let Some(raw) = &self.date {
            let days = TimeDelta::try_days(delta.num_days()).ok_or(InvalidTime)?;
            let shifted = NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map_err(|_| InvalidTime)?
                .checked_add_signed(days)
                .ok_or(InvalidTime)?;
            return Ok(EventBoundary {
                date_time: None,
                date: Some(shifted.format(DATE_FORMAT).to_string()),
                time_zone: self.time_zone.clone(),
            });
        }

        Err(InvalidTime)
    }
}

fn shift_date_time(raw: &str, delta: TimeDelta) -> Result<String, InvalidTime> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        let shifted = instant.checked_add_signed(delta).ok_or(InvalidTime)?;
        let use_z = raw.ends_with('Z') || raw.ends_with('z');
        return Ok(shifted.to_rfc3339_opts(SecondsFormat::AutoSi, use_z));
    }

    // Google accepts an offset-less dateTime when a timeZone label is given.
    let local = NaiveDateTime::parse_from_str(raw, LOCAL_DATE_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|_| InvalidTime)?;
    let shifted = local.checked_add_signed(delta).ok_or(InvalidTime)?;
    Ok(shifted.format(LOCAL_DATE_TIME_FORMAT).to_string())
}

/// Pre-mutation state of one remote event. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub id: ResourceId,
    pub title: String,
    pub description: String,
    pub start: EventBoundary,
    pub end: EventBoundary,
}

impl std::fmt::Display for ResourceSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Body of `GET /events/{id}`. Only the fields the engine needs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RemoteEvent {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<EventBoundary>,
    pub end: Option<EventBoundary>,
}

impl RemoteEvent {
    pub fn into_snapshot(self, id: ResourceId) -> ResourceSnapshot {
        ResourceSnapshot {
            id,
            title: self
                .summary
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNTITLED_EVENT.to_string()),
            description: self.description.unwrap_or_default(),
            start: self.start.unwrap_or_default(),
            end: self.end.unwrap_or_default(),
        }
    }
}

/// Body of `PATCH /events/{id}`: only the boundary fields are sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryPatch {
    pub start: EventBoundary,
    pub end: EventBoundary,
}

impl BoundaryPatch {
    pub fn shift(snapshot: &ResourceSnapshot, minutes: i64) -> Result<Self, InvalidTime> {
        Ok(BoundaryPatch {
            start: snapshot.start.shifted_by(minutes)?,
            end: snapshot.end.shifted_by(minutes)?,
        })
    }
}

/// Body of `POST /events`, used to recreate a deleted event on undo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub start: EventBoundary,
    pub end: EventBoundary,
}

impl From<&ResourceSnapshot> for NewEvent {
    fn from(snapshot: &ResourceSnapshot) -> Self {
        NewEvent {
            summary: snapshot.title.clone(),
            description: snapshot.description.clone(),
            start: snapshot.start.clone(),
            end: snapshot.end.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_day_shift_stays_all_day() {
        let start = EventBoundary::all_day("2024-01-01");

        let same_day = start.shifted_by(60).unwrap();
        assert_eq!(same_day.date.as_deref(), Some("2024-01-01"));
        assert_eq!(same_day.date_time, None);

        let next_day = start.shifted_by(24 * 60).unwrap();
        assert_eq!(next_day.date.as_deref(), Some("2024-01-02"));
        assert_eq!(next_day.date_time, None);
    }

    #[test]
    fn test_all_day_shift_moves_by_whole_days() {
        let start = EventBoundary::all_day("2024-03-01");

        assert_eq!(start.shifted_by(-1).unwrap().date.as_deref(), Some("2024-03-01"));
        assert_eq!(start.shifted_by(-24 * 60).unwrap().date.as_deref(), Some("2024-02-29"));
        assert_eq!(start.shifted_by(-36 * 60).unwrap().date.as_deref(), Some("2024-02-29"));
        assert_eq!(start.shifted_by(50 * 60).unwrap().date.as_deref(), Some("2024-03-03"));
    }

    #[test]
    fn test_all_day_shift_is_reversible_for_any_delta() {
        let start = EventBoundary::all_day("2024-03-04");
        for minutes in [1, 30, 90, 1439, 1441, 2 * 1440 + 7, -30, -1441] {
            let back = start
                .shifted_by(minutes)
                .unwrap()
                .shifted_by(-minutes)
                .unwrap();
            assert_eq!(back, start, "shift by {} was not undone", minutes);
        }
    }

    #[test]
    fn test_date_time_shift_keeps_offset_and_zone_label() {
        let start = EventBoundary::date_time("2024-05-10T23:30:00+02:00", Some("Europe/Berlin"));
        let shifted = start.shifted_by(45).unwrap();

        assert_eq!(shifted.date_time.as_deref(), Some("2024-05-11T00:15:00+02:00"));
        assert_eq!(shifted.time_zone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(shifted.date, None);
    }

    #[test]
    fn test_utc_shift_keeps_z_suffix() {
        let start = EventBoundary::date_time("2024-05-10T09:00:00Z", None);
        let shifted = start.shifted_by(-90).unwrap();
        assert_eq!(shifted.date_time.as_deref(), Some("2024-05-10T07:30:00Z"));
    }

    #[test]
    fn test_offsetless_date_time_shifts_as_wall_time() {
        let start = EventBoundary::date_time("2024-05-10T09:00:00", Some("America/New_York"));
        let shifted = start.shifted_by(30).unwrap();
        assert_eq!(shifted.date_time.as_deref(), Some("2024-05-10T09:30:00"));
        assert_eq!(shifted.time_zone.as_deref(), Some("America/New_York"));
    }

    #[test]
    fn test_unparsable_or_missing_boundary_is_invalid() {
        assert_eq!(
            EventBoundary::date_time("next tuesday", None).shifted_by(10),
            Err(InvalidTime)
        );
        assert_eq!(EventBoundary::all_day("2024-13-40").shifted_by(10), Err(InvalidTime));
        assert_eq!(EventBoundary::default().shifted_by(10), Err(InvalidTime));
    }

    #[test]
    fn test_remote_event_defaults_missing_title_and_description() {
        let remote: RemoteEvent = serde_json::from_str(
            r#"{"start":{"date":"2024-01-01"},"end":{"date":"2024-01-02"}}"#,
        )
        .unwrap();
        let snapshot = remote.into_snapshot(ResourceId::new("abc"));

        assert_eq!(snapshot.title, UNTITLED_EVENT);
        assert_eq!(snapshot.description, "");
        assert!(snapshot.start.is_all_day());
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let snapshot = ResourceSnapshot {
            id: ResourceId::new("abc"),
            title: "Standup".to_string(),
            description: String::new(),
            start: EventBoundary::all_day("2024-01-01"),
            end: EventBoundary::all_day("2024-01-02"),
        };

        let patch = BoundaryPatch::shift(&snapshot, 24 * 60).unwrap();
        let json = serde_json::to_value(&patch).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "start": {"date": "2024-01-02"},
                "end": {"date": "2024-01-03"}
            })
        );
    }
}
