use serde::Serialize;
use tracing::{debug, warn};

use campus_types::api::AuthenView;
use campus_types::models::{
    Comment, Course, CourseDiscussion, Discussion, Event, Identity, Professor, Review,
};
use campus_upstream::{FetchError, Upstream};

use crate::events::normalize_event;
use crate::filter::{filter_course_discussions, filter_discussions, filter_reviews};

/// Everything the "my workplace" page shows, built once per request.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub authen: AuthenView,
    pub events: Vec<Event>,
    pub discussions: Vec<Discussion>,
    pub comments: Vec<Comment>,
    /// Empty for non-admins.
    pub courses: Vec<Course>,
    /// Empty for non-admins.
    pub professors: Vec<Professor>,
    #[serde(rename = "professorsReviews")]
    pub reviews: Vec<Review>,
    #[serde(rename = "coursesDiscussions")]
    pub course_discussions: Vec<CourseDiscussion>,
    #[serde(rename = "coursesDiscussionComments")]
    pub course_comments: Vec<Comment>,
}

#[derive(Debug, Clone)]
pub enum DashboardOutcome {
    /// The caller is not logged in.
    RedirectToLogin,
    Ready(Box<DashboardView>),
}

/// Assemble the dashboard for `identity`.
///
/// Upstream calls run one after another. Only the course-discussion read is
/// best-effort; any other failure is returned to the caller.
pub async fn build_dashboard<U>(
    upstream: &U,
    identity: &Identity,
) -> Result<DashboardOutcome, FetchError>
where
    U: Upstream + ?Sized,
{
    if !identity.is_authenticated() {
        return Ok(DashboardOutcome::RedirectToLogin);
    }
    let token = identity.bearer();

    let (discussions, comments) = filter_discussions(upstream.discussions().await?, identity);

    let professors = upstream.professors(token).await?;
    let reviews = filter_reviews(&professors, identity);

    let courses = upstream.courses(token).await?;

    let course_discussions = upstream
        .course_discussions(token)
        .await
        .unwrap_or_else(|e| {
            warn!("course discussions unavailable, showing none: {}", e);
            Vec::new()
        });
    let (course_discussions, course_comments) =
        filter_course_discussions(course_discussions, identity);

    let admin = identity.is_admin();
    let events = match identity.user_id {
        _ if admin => upstream.events().await?,
        Some(user_id) => upstream.events_by_creator(user_id, token).await?,
        None => Vec::new(),
    };
    let events: Vec<Event> = events.into_iter().map(normalize_event).collect();

    debug!(
        role = %identity.role,
        events = events.len(),
        discussions = discussions.len(),
        comments = comments.len(),
        reviews = reviews.len(),
        course_discussions = course_discussions.len(),
        "dashboard assembled"
    );

    // Raw course and professor lists are an admin-only view.
    let (courses, professors) = if admin {
        (courses, professors)
    } else {
        (Vec::new(), Vec::new())
    };

    Ok(DashboardOutcome::Ready(Box::new(DashboardView {
        authen: AuthenView::from(identity),
        events,
        discussions,
        comments,
        courses,
        professors,
        reviews,
        course_discussions,
        course_comments,
    })))
}
