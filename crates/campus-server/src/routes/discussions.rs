use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use campus_core::dates::normalize_field;
use campus_core::paginate::{DISCUSSIONS_PAGE_SIZE, Page, paginate};
use campus_types::api::{AuthenView, CommentForm, DiscussionForm, NewComment, NewDiscussion};
use campus_types::models::{Comment, Discussion, Identity};
use campus_upstream::Upstream;

use crate::error::{AppError, form_error};
use crate::routes::{AppState, PageQuery, login_redirect};

fn normalize_discussion(mut discussion: Discussion) -> Discussion {
    normalize_field(&mut discussion.created_at);
    for comment in &mut discussion.comments {
        normalize_field(&mut comment.created_at);
    }
    discussion
}

#[derive(Serialize)]
pub struct DiscussionListView {
    pub authen: AuthenView,
    pub discussions: Page<Discussion>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<PageQuery>,
) -> Json<DiscussionListView> {
    let discussions = state.upstream.discussions().await.unwrap_or_else(|e| {
        warn!("discussions unavailable, showing none: {}", e);
        Vec::new()
    });
    let discussions = discussions.into_iter().map(normalize_discussion).collect();

    Json(DiscussionListView {
        authen: AuthenView::from(&identity),
        discussions: paginate(discussions, query.number(), DISCUSSIONS_PAGE_SIZE),
    })
}

#[derive(Serialize)]
pub struct DiscussionView {
    pub authen: AuthenView,
    pub discussion: Discussion,
    pub comments: Vec<Comment>,
}

pub async fn detail(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> Result<Json<DiscussionView>, AppError> {
    let discussion = state
        .upstream
        .discussion(id)
        .await?
        .ok_or(AppError::NotFound)?;
    let mut comments = state.upstream.comments_for(id).await?;
    for comment in &mut comments {
        normalize_field(&mut comment.created_at);
    }

    Ok(Json(DiscussionView {
        authen: AuthenView::from(&identity),
        discussion: normalize_discussion(discussion),
        comments,
    }))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<DiscussionForm>,
) -> Result<Response, AppError> {
    if !identity.is_authenticated() {
        return Ok(login_redirect());
    }
    let (title, body) = (form.title.trim(), form.body.trim());
    if title.is_empty() || body.is_empty() {
        return Ok(form_error(
            StatusCode::BAD_REQUEST,
            json!("Title and body are required."),
        ));
    }

    let discussion = NewDiscussion {
        title,
        body,
        author: identity.email.as_deref().unwrap_or_default(),
        creator_id: identity.user_id,
    };
    if state
        .upstream
        .create_discussion(identity.bearer(), &discussion)
        .await?
    {
        Ok(Redirect::to("/discussions").into_response())
    } else {
        Ok(form_error(
            StatusCode::BAD_REQUEST,
            json!("The discussion could not be created."),
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
    if state.upstream.remove_discussion(id, identity.bearer()).await? {
        Ok(Redirect::to("/discussions").into_response())
    } else {
        Ok(form_error(
            StatusCode::FORBIDDEN,
            json!("The discussion could not be deleted."),
        ))
    }
}

/// Add a comment, then return to the discussion whether or not it was accepted.
pub async fn comment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Response, AppError> {
    if !identity.is_authenticated() {
        return Ok(login_redirect());
    }

    let body = form.body.trim();
    if !body.is_empty() {
        let comment = NewComment {
            discussion: id,
            author: identity.email.as_deref().unwrap_or_default(),
            body,
            creator_id: identity.user_id,
        };
        if !state.upstream.create_comment(identity.bearer(), &comment).await? {
            warn!(discussion_id = id, "comment was not accepted");
        }
    }
    Ok(Redirect::to(&format!("/discussions/{id}")).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::get as route_get;
    use axum::{Json, Router};
    use campus_types::models::Role;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::routes::tests::*;

    fn forum(posted: Arc<Mutex<Vec<Value>>>) -> Router {
        let discussions: Vec<_> = (1..=12)
            .map(|id| json!({ "id": id, "title": format!("Thread {id}"), "created_at": "2024-01-01" }))
            .collect();

        Router::new()
            .route(
                "/api/discussions/",
                route_get(move || async move { Json(json!(discussions)) }).post({
                    let posted = posted.clone();
                    move |Json(body): Json<Value>| async move {
                        posted.lock().unwrap().push(body);
                        StatusCode::CREATED
                    }
                }),
            )
            .route(
                "/api/discussions/{id}/",
                route_get(|Path(id): Path<i64>| async move {
                    Json(json!({ "id": id, "title": "Thread", "comments": [] }))
                }),
            )
            .route(
                "/api/comments/",
                route_get(|| async {
                    Json(json!([{ "id": 9, "body": "first", "discussion": 3,
                                  "created_at": "2024-02-03T04:05:06Z" }]))
                })
                .post(move |Json(body): Json<Value>| async move {
                    posted.lock().unwrap().push(body);
                    StatusCode::BAD_REQUEST
                }),
            )
    }

    #[tokio::test]
    async fn list_pages_by_ten() {
        let app = app_with(forum(Arc::default())).await;
        let response = app.oneshot(get("/discussions?page=2", None)).await.unwrap();
        let body = json_body(response).await;

        assert_eq!(body["discussions"]["items"].as_array().unwrap().len(), 2);
        assert_eq!(body["discussions"]["total_pages"], json!(2));
        assert_eq!(body["discussions"]["has_next"], json!(false));
    }

    #[tokio::test]
    async fn list_degrades_to_empty_when_service_is_down() {
        let app = app_offline().await;
        let response = app.oneshot(get("/discussions", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["discussions"]["items"], json!([]));
    }

    #[tokio::test]
    async fn detail_carries_comments() {
        let app = app_with(forum(Arc::default())).await;
        let response = app.oneshot(get("/discussions/3", None)).await.unwrap();
        let body = json_body(response).await;

        assert_eq!(body["discussion"]["id"], json!(3));
        assert_eq!(body["comments"][0]["body"], json!("first"));
        assert_eq!(body["comments"][0]["discussion_id"], json!(3));
    }

    #[tokio::test]
    async fn create_requires_title_and_body() {
        let posted = Arc::new(Mutex::new(Vec::new()));
        let app = app_with(forum(posted.clone())).await;
        let cookie = session_for(10, Role::Student);

        let response = app
            .clone()
            .oneshot(post_form("/discussions", Some(&cookie), "title=Hi&body=+"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(posted.lock().unwrap().is_empty());

        let response = app
            .oneshot(post_form("/discussions", Some(&cookie), "title=Hi&body=There"))
            .await
            .unwrap();
        assert_eq!(location(&response), "/discussions");
        let sent = posted.lock().unwrap()[0].clone();
        assert_eq!(sent["author"], json!("user@example.com"));
        assert_eq!(sent["creator_id"], json!(10));
    }

    #[tokio::test]
    async fn rejected_comment_still_returns_to_discussion() {
        let posted = Arc::new(Mutex::new(Vec::new()));
        let app = app_with(forum(posted.clone())).await;
        let cookie = session_for(10, Role::Student);

        let response = app
            .oneshot(post_form("/discussions/3/comments", Some(&cookie), "body=Nice"))
            .await
            .unwrap();
        assert_eq!(location(&response), "/discussions/3");
        assert_eq!(posted.lock().unwrap()[0]["discussion"], json!(3));
    }

    #[tokio::test]
    async fn anonymous_cannot_post() {
        let app = app_offline().await;
        let response = app
            .oneshot(post_form("/discussions", None, "title=Hi&body=There"))
            .await
            .unwrap();
        assert_eq!(location(&response), "/login");
    }
}
