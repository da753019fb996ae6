use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Identity, Role, StudentRef};

// -- Authen --

/// Login state as shown to every page.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenView {
    pub is_login: bool,
    pub user_email: Option<String>,
    pub role: Role,
    pub user_id: Option<i64>,
}

impl From<&Identity> for AuthenView {
    fn from(identity: &Identity) -> Self {
        Self {
            is_login: identity.is_authenticated(),
            user_email: identity.email.clone(),
            role: identity.role.clone(),
            user_id: identity.user_id,
        }
    }
}

// -- Auth service --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default, alias = "Email")]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful answer of the auth service's login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub user_id: i64,
    #[serde(default)]
    pub role: Role,
}

impl LoginResponse {
    pub fn into_identity(self) -> Identity {
        Identity {
            user_id: Some(self.user_id),
            email: self.email,
            role: self.role,
            access_token: Some(self.access),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

// -- Events --

/// Event form exactly as posted by the browser; every field is text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub creator_id: String,
    #[serde(default, rename = "eventType")]
    pub event_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub capacity: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub zoom_link: String,
    #[serde(default)]
    pub hosted_by: String,
    #[serde(default)]
    pub event_start_date: String,
    #[serde(default)]
    pub event_end_date: String,
    #[serde(default)]
    pub registered_students: String,
}

/// Event body sent to the events service on create and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPayload {
    pub title: String,
    pub description: String,
    pub creator: String,
    pub creator_id: Option<i64>,
    #[serde(rename = "eventType")]
    pub event_type: String,
    pub location: String,
    pub capacity: i64,
    pub link: Option<String>,
    pub zoom_link: Option<String>,
    pub hosted_by: String,
    pub event_start_date: String,
    pub event_end_date: String,
    pub registered_students: Vec<StudentRef>,
}

// -- Discussions --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscussionForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct NewDiscussion<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub author: &'a str,
    pub creator_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct NewComment<'a> {
    pub discussion: i64,
    pub author: &'a str,
    pub body: &'a str,
    pub creator_id: Option<i64>,
}

// -- Professors --

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct NewReview<'a> {
    pub author: &'a str,
    pub rating: &'a str,
    pub comment: &'a str,
    pub creator_id: Option<i64>,
}

// -- Courses --

/// Course search filters; blank values are not forwarded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseQuery {
    #[serde(default, rename = "courseSubject")]
    pub course_subject: String,
    #[serde(default, rename = "courseID")]
    pub course_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub instructor: String,
}

impl CourseQuery {
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        [
            ("courseSubject", self.course_subject.as_str()),
            ("courseID", self.course_id.as_str()),
            ("title", self.title.as_str()),
            ("instructor", self.instructor.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.params().is_empty()
    }
}

// -- Errors --

/// Error body returned to the browser.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: Value,
}
