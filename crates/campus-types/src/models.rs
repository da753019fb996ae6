use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

// -- Identity --

/// Role reported by the auth service at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Student,
    Staff,
    Admin,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Student => "STUDENT",
            Role::Staff => "STAFF",
            Role::Admin => "ADMIN",
            Role::Other(raw) => raw,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Other(String::new())
    }
}

impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("STUDENT") {
            Role::Student
        } else if raw.eq_ignore_ascii_case("STAFF") {
            Role::Staff
        } else if raw.eq_ignore_ascii_case("ADMIN") {
            Role::Admin
        } else {
            Role::Other(raw.to_string())
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Role::from(raw.unwrap_or_default().as_str()))
    }
}

/// The caller of a request, as established by the auth service at login.
///
/// Passed explicitly into every filtering and aggregation function; nothing in
/// the core reads identity from ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub role: Role,
    /// Bearer token for upstream calls. Present only for logged-in callers.
    pub access_token: Option<String>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn bearer(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// True when `creator_id` names this caller. A missing id on either side never matches.
    pub fn owns(&self, creator_id: Option<i64>) -> bool {
        matches!((self.user_id, creator_id), (Some(me), Some(creator)) if me == creator)
    }
}

// -- Dates --

/// A date field as received from an upstream service.
///
/// Upstream payloads always decode to `Raw`; the date normalizer turns values it
/// can read into `Parsed` and leaves everything else untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DateValue {
    Parsed(DateTime<Utc>),
    Raw(String),
}

impl DateValue {
    pub fn parsed(&self) -> Option<&DateTime<Utc>> {
        match self {
            DateValue::Parsed(dt) => Some(dt),
            DateValue::Raw(_) => None,
        }
    }
}

impl From<DateTime<Utc>> for DateValue {
    fn from(dt: DateTime<Utc>) -> Self {
        DateValue::Parsed(dt)
    }
}

impl From<&str> for DateValue {
    fn from(raw: &str) -> Self {
        DateValue::Raw(raw.to_string())
    }
}

impl<'de> Deserialize<'de> for DateValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Anything that is not a string (epoch numbers, objects) is kept verbatim
        // rather than failing the whole record.
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => DateValue::Raw(s),
            other => DateValue::Raw(other.to_string()),
        })
    }
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Ids come back as numbers from most services and as strings from form-backed ones.
    pub fn opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(opt_string(deserializer)?.unwrap_or_default())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => Some(s),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
    }

    /// A `null` list reads as empty.
    pub fn vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Registered students arrive as a list, as `null`, or as the comma-separated
    /// text the event form submits.
    pub fn students<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<super::StudentRef>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(raw)) => Ok(super::StudentRef::parse_list(&raw)),
            Some(other) => serde_json::from_value(other).map_err(serde::de::Error::custom),
        }
    }
}

// -- Discussions --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub creator_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateValue>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub creator_id: Option<i64>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub created_at: Option<DateValue>,
    #[serde(default, alias = "discussion", deserialize_with = "lenient::opt_id")]
    pub discussion_id: Option<i64>,
    /// Set when the comment was lifted out of a course discussion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_subject: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub course_id: Option<String>,
}

/// A discussion thread attached to one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDiscussion {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub creator_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateValue>,
    #[serde(default, alias = "courseSubject")]
    pub course_subject: String,
    #[serde(default, alias = "courseID", deserialize_with = "lenient::string")]
    pub course_id: String,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub comments: Vec<Comment>,
}

// -- Professors --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professor {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub reviews: Vec<Review>,
    /// Department, ratings summary and whatever else the service sends along.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub creator_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateValue>,
    #[serde(default, alias = "comment")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// -- Events --

/// Entry of an event's `registered_students`: a numeric user id, or a free-form name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudentRef {
    Id(i64),
    Name(String),
}

impl StudentRef {
    /// Parse `"1, 2, abc"` into `[1, 2, "abc"]`. Blank entries are dropped.
    pub fn parse_list(raw: &str) -> Vec<StudentRef> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.bytes().all(|b| b.is_ascii_digit()) {
                    s.parse().map_or_else(|_| StudentRef::Name(s.to_string()), StudentRef::Id)
                } else {
                    StudentRef::Name(s.to_string())
                }
            })
            .collect()
    }
}

impl fmt::Display for StudentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StudentRef::Id(id) => write!(f, "{id}"),
            StudentRef::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "eventID")]
    pub event_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::opt_id")]
    pub creator_id: Option<i64>,
    #[serde(default)]
    pub event_start_date: Option<DateValue>,
    #[serde(default)]
    pub event_end_date: Option<DateValue>,
    #[serde(default)]
    pub created_at: Option<DateValue>,
    #[serde(default, deserialize_with = "lenient::students")]
    pub registered_students: Vec<StudentRef>,
    /// Description, location, capacity, links and so on, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// -- Courses --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "courseSubject", default)]
    pub course_subject: String,
    #[serde(rename = "courseID", default, deserialize_with = "lenient::string")]
    pub course_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
