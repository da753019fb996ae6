use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::warn;
use url::Url;

use campus_types::api::{
    CourseQuery, EventPayload, LoginRequest, LoginResponse, NewComment, NewDiscussion, NewReview,
    RegisterRequest,
};
use campus_types::models::{Comment, Course, CourseDiscussion, Discussion, Event, Professor};

use crate::client::{HttpClient, NO_BODY};
use crate::error::FetchError;

/// Reads the dashboard needs, one per upstream collection.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// All discussions, fetched without credentials.
    async fn discussions(&self) -> Result<Vec<Discussion>, FetchError>;

    async fn professors(&self, token: Option<&str>) -> Result<Vec<Professor>, FetchError>;

    async fn courses(&self, token: Option<&str>) -> Result<Vec<Course>, FetchError>;

    async fn course_discussions(
        &self,
        token: Option<&str>,
    ) -> Result<Vec<CourseDiscussion>, FetchError>;

    /// The full event collection, fetched without credentials.
    async fn events(&self) -> Result<Vec<Event>, FetchError>;

    /// Events created by `creator_id`.
    async fn events_by_creator(
        &self,
        creator_id: i64,
        token: Option<&str>,
    ) -> Result<Vec<Event>, FetchError>;
}

/// Base URL of every upstream service. Each must end with `/`.
#[derive(Debug, Clone)]
pub struct ServiceUrls {
    pub auth: Url,
    pub events: Url,
    pub discussions: Url,
    pub comments: Url,
    pub course_discussions: Url,
    pub courses: Url,
    pub professors: Url,
}

/// Result of a registration attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    Created,
    /// The auth service refused; carries its error body for display.
    Rejected(Value),
}

/// [`Upstream`] over real HTTP, plus the CRUD calls behind the front-end pages.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    http: HttpClient,
    urls: ServiceUrls,
}

impl HttpUpstream {
    pub fn new(http: HttpClient, urls: ServiceUrls) -> Self {
        Self { http, urls }
    }

    pub fn urls(&self) -> &ServiceUrls {
        &self.urls
    }

    // -- Auth --

    /// `Ok(None)` when the credentials were refused.
    pub async fn login(&self, req: &LoginRequest<'_>) -> Result<Option<LoginResponse>, FetchError> {
        let url = self.urls.auth.join("login/")?;
        let (status, body) = self.http.fetch(Method::POST, url.clone(), None, Some(req)).await?;
        if status != StatusCode::OK {
            warn!(%url, %status, "login refused");
            return Ok(None);
        }
        serde_json::from_value(body)
            .map(Some)
            .map_err(|source| FetchError::Decode {
                url: url.to_string(),
                source,
            })
    }

    pub async fn register(&self, req: &RegisterRequest<'_>) -> Result<RegisterOutcome, FetchError> {
        let url = self.urls.auth.join("register/")?;
        let (status, body) = self.http.fetch(Method::POST, url, None, Some(req)).await?;
        if status == StatusCode::CREATED {
            Ok(RegisterOutcome::Created)
        } else {
            Ok(RegisterOutcome::Rejected(body))
        }
    }

    // -- Events --

    pub async fn event(&self, id: i64) -> Result<Option<Event>, FetchError> {
        let url = self.urls.events.join(&format!("{id}/"))?;
        self.http.fetch_one(url, None).await
    }

    pub async fn create_event(
        &self,
        token: Option<&str>,
        payload: &EventPayload,
    ) -> Result<Option<Event>, FetchError> {
        let url = self.urls.events.join("create/")?;
        self.http.create(url, token, payload).await
    }

    pub async fn update_event(
        &self,
        id: i64,
        token: Option<&str>,
        payload: &EventPayload,
    ) -> Result<bool, FetchError> {
        let url = self.urls.events.join(&format!("{id}/"))?;
        self.http
            .mutate(Method::PUT, url, token, Some(payload), StatusCode::OK)
            .await
    }

    pub async fn remove_event(&self, id: i64, token: Option<&str>) -> Result<bool, FetchError> {
        let url = self.urls.events.join(&format!("{id}/"))?;
        self.http
            .mutate(Method::DELETE, url, token, NO_BODY, StatusCode::NO_CONTENT)
            .await
    }

    // -- Discussions --

    pub async fn discussion(&self, id: i64) -> Result<Option<Discussion>, FetchError> {
        let url = self.urls.discussions.join(&format!("{id}/"))?;
        self.http.fetch_one(url, None).await
    }

    pub async fn comments_for(&self, discussion_id: i64) -> Result<Vec<Comment>, FetchError> {
        let mut url = self.urls.comments.clone();
        url.query_pairs_mut()
            .append_pair("discussion", &discussion_id.to_string());
        self.http.fetch_list(url, None).await
    }

    pub async fn create_discussion(
        &self,
        token: Option<&str>,
        discussion: &NewDiscussion<'_>,
    ) -> Result<bool, FetchError> {
        self.http
            .mutate(
                Method::POST,
                self.urls.discussions.clone(),
                token,
                Some(discussion),
                StatusCode::CREATED,
            )
            .await
    }

    pub async fn remove_discussion(&self, id: i64, token: Option<&str>) -> Result<bool, FetchError> {
        let url = self.urls.discussions.join(&format!("{id}/"))?;
        self.http
            .mutate(Method::DELETE, url, token, NO_BODY, StatusCode::NO_CONTENT)
            .await
    }

    pub async fn create_comment(
        &self,
        token: Option<&str>,
        comment: &NewComment<'_>,
    ) -> Result<bool, FetchError> {
        self.http
            .mutate(
                Method::POST,
                self.urls.comments.clone(),
                token,
                Some(comment),
                StatusCode::CREATED,
            )
            .await
    }

    // -- Courses --

    pub async fn search_courses(
        &self,
        token: Option<&str>,
        query: &CourseQuery,
    ) -> Result<Vec<Course>, FetchError> {
        let mut url = self.urls.courses.clone();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.params());
        }
        self.http.fetch_list(url, token).await
    }

    // -- Professors --

    pub async fn search_professors(
        &self,
        token: Option<&str>,
        query: &str,
    ) -> Result<Vec<Professor>, FetchError> {
        let mut url = self.urls.professors.clone();
        if !query.trim().is_empty() {
            url.query_pairs_mut().append_pair("query", query.trim());
        }
        self.http.fetch_list(url, token).await
    }

    pub async fn professor(
        &self,
        id: i64,
        token: Option<&str>,
    ) -> Result<Option<Professor>, FetchError> {
        let url = self.urls.professors.join(&format!("{id}/"))?;
        self.http.fetch_one(url, token).await
    }

    pub async fn create_review(
        &self,
        professor_id: i64,
        token: Option<&str>,
        review: &NewReview<'_>,
    ) -> Result<bool, FetchError> {
        let url = self.urls.professors.join(&format!("{professor_id}/review/"))?;
        self.http
            .mutate(Method::POST, url, token, Some(review), StatusCode::CREATED)
            .await
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn discussions(&self) -> Result<Vec<Discussion>, FetchError> {
        self.http.fetch_list(self.urls.discussions.clone(), None).await
    }

    async fn professors(&self, token: Option<&str>) -> Result<Vec<Professor>, FetchError> {
        self.http.fetch_list(self.urls.professors.clone(), token).await
    }

    async fn courses(&self, token: Option<&str>) -> Result<Vec<Course>, FetchError> {
        self.http.fetch_list(self.urls.courses.clone(), token).await
    }

    async fn course_discussions(
        &self,
        token: Option<&str>,
    ) -> Result<Vec<CourseDiscussion>, FetchError> {
        self.http
            .fetch_list(self.urls.course_discussions.clone(), token)
            .await
    }

    async fn events(&self) -> Result<Vec<Event>, FetchError> {
        self.http.fetch_list(self.urls.events.clone(), None).await
    }

    async fn events_by_creator(
        &self,
        creator_id: i64,
        token: Option<&str>,
    ) -> Result<Vec<Event>, FetchError> {
        let url = self.urls.events.join(&format!("{creator_id}/creator_id/"))?;
        self.http.fetch_list(url, token).await
    }
}
