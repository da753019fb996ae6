use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use campus_core::events::{
    EventEditView, EventSort, event_payload, normalize_event, search_events, sort_events,
};
use campus_core::paginate::{EVENTS_PAGE_SIZE, Page, paginate};
use campus_types::api::{AuthenView, EventForm};
use campus_types::models::{Event, Identity};
use campus_upstream::{FetchError, Upstream};

use crate::error::{AppError, form_error};
use crate::routes::{AppState, login_redirect, page_number};

#[derive(Debug, Default, Deserialize)]
pub struct EventListQuery {
    pub sort: Option<EventSort>,
    pub q: Option<String>,
    pub page: Option<String>,
}

#[derive(Serialize)]
pub struct EventListView {
    pub authen: AuthenView,
    pub events: Page<Event>,
    pub q: String,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<EventListQuery>,
) -> Json<EventListView> {
    let events = state.upstream.events().await.unwrap_or_else(|e| {
        warn!("events unavailable, showing none: {}", e);
        Vec::new()
    });

    let q = query.q.unwrap_or_default();
    let mut events = search_events(events.into_iter().map(normalize_event).collect(), &q);
    sort_events(&mut events, query.sort.unwrap_or(EventSort::Start));

    Json(EventListView {
        authen: AuthenView::from(&identity),
        events: paginate(events, page_number(query.page.as_deref()), EVENTS_PAGE_SIZE),
        q,
    })
}

#[derive(Serialize)]
pub struct EventView {
    pub authen: AuthenView,
    pub event: Event,
}

pub async fn detail(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<Json<EventView>, AppError> {
    let event = state.upstream.event(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(EventView {
        authen: AuthenView::from(&identity),
        event: normalize_event(event),
    }))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    if !identity.is_authenticated() {
        return Ok(login_redirect());
    }
    let event = state.upstream.event(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(EventEditView::from(event)).into_response())
}

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    if !identity.is_authenticated() {
        return Ok(login_redirect());
    }
    let payload = match event_payload(form, identity.user_id) {
        Ok(payload) => payload,
        Err(e) => {
            return Ok(form_error(
                StatusCode::BAD_REQUEST,
                json!(format!("Validation error: {e}")),
            ));
        }
    };

    match state.upstream.create_event(identity.bearer(), &payload).await {
        Ok(Some(event)) => {
            info!(event_id = event.event_id, "event created");
            Ok(Redirect::to(&format!("/events/{}", event.event_id)).into_response())
        }
        Ok(None) => Ok(form_error(
            StatusCode::BAD_REQUEST,
            json!("API Error: the events service rejected the event."),
        )),
        Err(FetchError::Decode { url, source }) => {
            warn!(%url, "created event could not be read: {}", source);
            Ok(form_error(
                StatusCode::BAD_GATEWAY,
                json!("Event ID not returned from API."),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    if !identity.is_authenticated() {
        return Ok(login_redirect());
    }
    let payload = match event_payload(form, identity.user_id) {
        Ok(payload) => payload,
        Err(e) => {
            return Ok(form_error(
                StatusCode::BAD_REQUEST,
                json!(format!("Validation error: {e}")),
            ));
        }
    };

    if state
        .upstream
        .update_event(id, identity.bearer(), &payload)
        .await?
    {
        Ok(Redirect::to(&format!("/events/{id}")).into_response())
    } else {
        Ok(form_error(
            StatusCode::BAD_REQUEST,
            json!("API Error: the events service rejected the update."),
        ))
    }
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    if !identity.is_authenticated() {
        return Ok(login_redirect());
    }
    if state.upstream.remove_event(id, identity.bearer()).await? {
        info!(event_id = id, "event removed");
        Ok(Redirect::to("/events").into_response())
    } else {
        Ok(form_error(
            StatusCode::FORBIDDEN,
            json!("The event could not be deleted."),
        ))
    }
}
