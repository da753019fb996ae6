use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use campus_types::api::{EventForm, EventPayload};
use campus_types::models::{DateValue, Event, StudentRef};

use crate::dates::{format_datetime_local, normalize_field};

/// Normalize the three date fields of an event.
pub fn normalize_event(mut event: Event) -> Event {
    normalize_field(&mut event.created_at);
    normalize_field(&mut event.event_start_date);
    normalize_field(&mut event.event_end_date);
    event
}

// -- Listing --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSort {
    /// Newest first.
    Created,
    /// Soonest start first.
    Start,
    /// Soonest end first.
    End,
}

/// Sort normalized events in place. Events whose date is missing or
/// unreadable go last, in their original order.
pub fn sort_events(events: &mut [Event], sort: EventSort) {
    let key = |event: &Event| -> Option<DateTime<Utc>> {
        let field = match sort {
            EventSort::Created => &event.created_at,
            EventSort::Start => &event.event_start_date,
            EventSort::End => &event.event_end_date,
        };
        field.as_ref().and_then(DateValue::parsed).copied()
    };

    events.sort_by(|a, b| match (key(a), key(b)) {
        (Some(a), Some(b)) if sort == EventSort::Created => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Case-insensitive keyword match on title, description and location.
pub fn search_events(events: Vec<Event>, query: &str) -> Vec<Event> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return events;
    }
    events
        .into_iter()
        .filter(|event| {
            let extra = |name: &str| match event.extra.get(name) {
                Some(Value::String(s)) => s.to_lowercase().contains(&needle),
                _ => false,
            };
            event.title.to_lowercase().contains(&needle) || extra("description") || extra("location")
        })
        .collect()
}

// -- Forms --

#[derive(Debug, Error, PartialEq)]
pub enum EventFormError {
    #[error("capacity must be a whole number, got `{0}`")]
    InvalidCapacity(String),
}

/// Parse `"1, 2, abc"` into `[1, 2, "abc"]`. Blank entries are dropped.
pub fn parse_registered_students(raw: &str) -> Vec<StudentRef> {
    StudentRef::parse_list(raw)
}

pub fn join_registered_students(students: &[StudentRef]) -> String {
    students
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn optional(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

/// Build the events-service body from a submitted form.
///
/// The form's own `creator_id` wins when it holds a number; otherwise the
/// submitting user is recorded as creator.
pub fn event_payload(form: EventForm, submitter: Option<i64>) -> Result<EventPayload, EventFormError> {
    let capacity = match form.capacity.trim() {
        "" => 0,
        raw => raw
            .parse()
            .map_err(|_| EventFormError::InvalidCapacity(raw.to_string()))?,
    };

    Ok(EventPayload {
        creator_id: form.creator_id.trim().parse().ok().or(submitter),
        registered_students: parse_registered_students(&form.registered_students),
        title: form.title,
        description: form.description,
        creator: form.creator,
        event_type: form.event_type,
        location: form.location,
        capacity,
        link: optional(form.link),
        zoom_link: optional(form.zoom_link),
        hosted_by: form.hosted_by,
        event_start_date: form.event_start_date,
        event_end_date: form.event_end_date,
    })
}

/// Event as pre-filled into the update form.
#[derive(Debug, Clone, Serialize)]
pub struct EventEditView {
    pub event: Event,
    pub event_start_date: String,
    pub event_end_date: String,
    pub registered_students: String,
    pub is_update: bool,
}

impl From<Event> for EventEditView {
    fn from(event: Event) -> Self {
        let local = |field: &Option<DateValue>| {
            field.as_ref().map(format_datetime_local).unwrap_or_default()
        };
        Self {
            event_start_date: local(&event.event_start_date),
            event_end_date: local(&event.event_end_date),
            registered_students: join_registered_students(&event.registered_students),
            is_update: true,
            event,
        }
    }
}
