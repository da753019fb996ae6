use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use campus_types::models::{Identity, Role};

use crate::routes::AppState;

pub const SESSION_COOKIE: &str = "campus_session";

/// What the session cookie carries between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: i64,
    pub email: Option<String>,
    pub role: Role,
    /// Upstream bearer token handed out by the auth service.
    pub access: String,
    pub exp: usize,
}

pub fn encode_session(
    secret: &str,
    identity: &Identity,
) -> Result<Option<String>, jsonwebtoken::errors::Error> {
    let (Some(sub), Some(access)) = (identity.user_id, identity.access_token.clone()) else {
        return Ok(None);
    };
    let claims = SessionClaims {
        sub,
        email: identity.email.clone(),
        role: identity.role.clone(),
        access,
        exp: (chrono::Utc::now() + chrono::Duration::days(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map(Some)
}

/// `None` for tampered, expired or otherwise unreadable sessions.
pub fn decode_session(secret: &str, token: &str) -> Option<Identity> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| debug!("discarding session cookie: {}", e))
    .ok()?;

    let claims = data.claims;
    Some(Identity {
        user_id: Some(claims.sub),
        email: claims.email,
        role: claims.role,
        access_token: Some(claims.access),
    })
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Resolve the caller from the session cookie. Callers without a valid
/// session proceed as anonymous; routes decide whether that is enough.
pub async fn load_identity(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let identity = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| decode_session(&state.session_secret, cookie.value()))
        .unwrap_or_else(Identity::anonymous);

    req.extensions_mut().insert(identity);
    next.run(req).await
}
