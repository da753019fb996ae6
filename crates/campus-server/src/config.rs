use std::time::Duration;

use anyhow::{Context, bail};
use url::Url;

use campus_upstream::ServiceUrls;

/// Placeholder session secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

pub struct Config {
    pub host: String,
    pub port: u16,
    pub session_secret: String,
    pub upstream_timeout: Duration,
    pub services: ServiceUrls,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let session_secret = std::env::var("CAMPUS_SESSION_SECRET").unwrap_or_default();
        if session_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&session_secret.as_str()) {
            bail!("CAMPUS_SESSION_SECRET is unset or still a placeholder");
        }

        let host = std::env::var("CAMPUS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("CAMPUS_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .context("CAMPUS_PORT must be a port number")?;
        let timeout_secs: u64 = std::env::var("CAMPUS_UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let services = ServiceUrls {
            auth: service_url("CAMPUS_AUTH_URL", "http://127.0.0.1:9001/api/auth/")?,
            events: service_url("CAMPUS_EVENTS_URL", "http://127.0.0.1:9002/api/events/")?,
            discussions: service_url(
                "CAMPUS_DISCUSSIONS_URL",
                "http://127.0.0.1:8000/api/discussions/",
            )?,
            comments: service_url("CAMPUS_COMMENTS_URL", "http://127.0.0.1:8000/api/comments/")?,
            course_discussions: service_url(
                "CAMPUS_COURSE_DISCUSSIONS_URL",
                "http://127.0.0.1:9005/api/course-discussions/",
            )?,
            courses: service_url("CAMPUS_COURSES_URL", "http://127.0.0.1:9004/api/courses/")?,
            professors: service_url(
                "CAMPUS_PROFESSORS_URL",
                "http://127.0.0.1:9003/api/professors/",
            )?,
        };

        Ok(Self {
            host,
            port,
            session_secret,
            upstream_timeout: Duration::from_secs(timeout_secs.max(1)),
            services,
        })
    }
}

/// Read a base URL, forcing the trailing slash that relative joins rely on.
fn service_url(var: &str, default: &str) -> anyhow::Result<Url> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.into());
    parse_base(&raw).with_context(|| format!("{var} is not a valid URL: {raw}"))
}

fn parse_base(raw: &str) -> Result<Url, url::ParseError> {
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{raw}/"))
    }
}
