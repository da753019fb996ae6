use axum::{
    Extension, Form, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::info;

use campus_types::api::{AuthenView, LoginForm, LoginRequest, RegisterForm, RegisterRequest};
use campus_types::models::Identity;
use campus_upstream::RegisterOutcome;

use crate::error::{AppError, form_error};
use crate::routes::AppState;
use crate::session::{clear_session, encode_session, session_cookie};

#[derive(Serialize)]
pub struct IndexView {
    pub authen: AuthenView,
}

pub async fn index(Extension(identity): Extension<Identity>) -> Json<IndexView> {
    Json(IndexView {
        authen: AuthenView::from(&identity),
    })
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if form.email.trim().is_empty() || form.password.is_empty() {
        return Ok(form_error(
            StatusCode::BAD_REQUEST,
            json!("All fields are required!"),
        ));
    }

    let req = LoginRequest {
        email: form.email.trim(),
        password: &form.password,
    };
    let Some(response) = state.upstream.login(&req).await? else {
        return Ok(form_error(
            StatusCode::UNAUTHORIZED,
            json!("Invalid login credentials"),
        ));
    };

    let identity = response.into_identity();
    let Some(token) = encode_session(&state.session_secret, &identity)? else {
        return Ok(form_error(
            StatusCode::UNAUTHORIZED,
            json!("Invalid login credentials"),
        ));
    };

    info!(user_id = ?identity.user_id, role = %identity.role, "user logged in");
    Ok((jar.add(session_cookie(token)), Redirect::to("/")).into_response())
}

/// Field name to message for every blank registration field.
fn missing_fields(form: &RegisterForm) -> Map<String, Value> {
    [
        ("username", form.username.as_str()),
        ("email", form.email.as_str()),
        ("password", form.password.as_str()),
        ("confirm_password", form.confirm_password.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| (field.to_string(), json!("This field is required.")))
    .collect()
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let missing = missing_fields(&form);
    if !missing.is_empty() {
        return Ok(form_error(StatusCode::BAD_REQUEST, Value::Object(missing)));
    }
    if form.password != form.confirm_password {
        return Ok(form_error(
            StatusCode::BAD_REQUEST,
            json!("Confirm Password must be same!"),
        ));
    }

    let req = RegisterRequest {
        username: form.username.trim(),
        email: form.email.trim(),
        password: &form.password,
    };
    match state.upstream.register(&req).await? {
        RegisterOutcome::Created => {
            info!(username = req.username, "user registered");
            Ok(Redirect::to("/login").into_response())
        }
        RegisterOutcome::Rejected(body) => Ok(form_error(StatusCode::BAD_REQUEST, body)),
    }
}

pub async fn logout(jar: CookieJar) -> Response {
    (clear_session(jar), Redirect::to("/login")).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header};
    use axum::{Json, Router};
    use axum::routing::post;
    use campus_types::models::Role;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::routes::tests::*;
    use crate::session::SESSION_COOKIE;

    fn auth_service() -> Router {
        Router::new()
            .route(
                "/api/auth/login/",
                post(|Json(body): Json<serde_json::Value>| async move {
                    if body["password"] == "right" {
                        (
                            StatusCode::OK,
                            Json(json!({
                                "access": "tok", "refresh": "ref",
                                "email": body["email"], "user_id": 5, "role": "STUDENT"
                            })),
                        )
                    } else {
                        (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "no" })))
                    }
                }),
            )
            .route(
                "/api/auth/register/",
                post(|Json(body): Json<serde_json::Value>| async move {
                    if body["username"] == "taken" {
                        (
                            StatusCode::BAD_REQUEST,
                            Json(json!({ "username": ["already exists"] })),
                        )
                    } else {
                        (StatusCode::CREATED, Json(json!({ "id": 1 })))
                    }
                }),
            )
    }

    #[tokio::test]
    async fn login_requires_both_fields() {
        let app = app_offline().await;
        let response = app
            .oneshot(post_form("/login", None, "email=a%40b.c&password="))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], json!("All fields are required!"));
    }

    #[tokio::test]
    async fn login_sets_session_and_redirects_home() {
        let app = app_with(auth_service()).await;

        let response = app
            .clone()
            .oneshot(post_form("/login", None, "email=a%40b.c&password=right"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=")));

        let session = cookie.split(';').next().unwrap().to_string();
        let response = app.oneshot(get("/", Some(&session))).await.unwrap();
        let body = json_body(response).await;
        assert_eq!(body["authen"]["is_login"], json!(true));
        assert_eq!(body["authen"]["user_id"], json!(5));
        assert_eq!(body["authen"]["user_email"], json!("a@b.c"));
    }

    #[tokio::test]
    async fn refused_login_is_reported() {
        let app = app_with(auth_service()).await;
        let response = app
            .oneshot(post_form("/login", None, "email=a%40b.c&password=wrong"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], json!("Invalid login credentials"));
    }

    #[tokio::test]
    async fn register_validates_before_calling_upstream() {
        let app = app_offline().await;

        let response = app
            .clone()
            .oneshot(post_form("/register", None, "username=ann&email="))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        let error = &body["error"];
        assert!(error.get("email").is_some());
        assert!(error.get("password").is_some());
        assert!(error.get("username").is_none());

        let response = app
            .oneshot(post_form(
                "/register",
                None,
                "username=ann&email=a%40b.c&password=one&confirm_password=two",
            ))
            .await
            .unwrap();
        assert_eq!(
            json_body(response).await["error"],
            json!("Confirm Password must be same!")
        );
    }

    #[tokio::test]
    async fn register_forwards_upstream_outcome() {
        let app = app_with(auth_service()).await;
        let form = |name: &str| {
            format!("username={name}&email=a%40b.c&password=pw&confirm_password=pw")
        };

        let response = app
            .clone()
            .oneshot(post_form("/register", None, &form("ann")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let response = app
            .oneshot(post_form("/register", None, &form("taken")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"]["username"][0],
            json!("already exists")
        );
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let app = app_offline().await;
        let cookie = session_for(5, Role::Student);

        let response = app.oneshot(get("/logout", Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
        let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cleared.starts_with(&format!("{SESSION_COOKIE}=;")));
    }
}
