use axum::{
    Extension, Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use campus_core::dashboard::{DashboardOutcome, DashboardView, build_dashboard};
use campus_core::paginate::{DASHBOARD_DISCUSSIONS_PAGE_SIZE, EVENTS_PAGE_SIZE, Page, paginate};
use campus_types::api::AuthenView;
use campus_types::models::{Comment, Course, CourseDiscussion, Discussion, Event, Identity, Professor, Review};

use crate::error::AppError;
use crate::routes::{AppState, login_redirect, page_number};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub events_page: Option<String>,
    pub discussions_page: Option<String>,
}

/// The dashboard with its two long lists cut into pages.
#[derive(Serialize)]
pub struct DashboardPage {
    pub authen: AuthenView,
    pub events: Page<Event>,
    pub discussions: Page<Discussion>,
    pub comments: Vec<Comment>,
    pub courses: Vec<Course>,
    pub professors: Vec<Professor>,
    #[serde(rename = "professorsReviews")]
    pub reviews: Vec<Review>,
    #[serde(rename = "coursesDiscussions")]
    pub course_discussions: Vec<CourseDiscussion>,
    #[serde(rename = "coursesDiscussionComments")]
    pub course_comments: Vec<Comment>,
}

impl DashboardPage {
    fn new(view: DashboardView, query: &DashboardQuery) -> Self {
        Self {
            authen: view.authen,
            events: paginate(
                view.events,
                page_number(query.events_page.as_deref()),
                EVENTS_PAGE_SIZE,
            ),
            discussions: paginate(
                view.discussions,
                page_number(query.discussions_page.as_deref()),
                DASHBOARD_DISCUSSIONS_PAGE_SIZE,
            ),
            comments: view.comments,
            courses: view.courses,
            professors: view.professors,
            reviews: view.reviews,
            course_discussions: view.course_discussions,
            course_comments: view.course_comments,
        }
    }
}

pub async fn myworkplace(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError> {
    match build_dashboard(&state.upstream, &identity).await? {
        DashboardOutcome::RedirectToLogin => Ok(login_redirect()),
        DashboardOutcome::Ready(view) => {
            Ok(Json(DashboardPage::new(*view, &query)).into_response())
        }
    }
}
