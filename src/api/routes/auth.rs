use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{discard_image, store_image};
use crate::api::extract::{required, AppJson, AuthUser, FormWithImage};
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::auth::{hash_password, verify_password, AuthError};
use crate::models::{normalize_email, NewUser, User};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub async fn register(
    State(state): State<AppState>,
    FormWithImage { fields, image }: FormWithImage<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let email = normalize_email(&required(fields.email, "email")?);
    let password = fields
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation("password is required".to_string()))?;
    let name = required(fields.name, "name")?;

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => return Err(ApiError::Validation(format!("{:?} is not an email address", email))),
    }

    let profile_pic = store_image(&state, image).await?;
    let user = match create_account(&state, email, password, name, profile_pic.clone()).await {
        Ok(user) => user,
        Err(e) => {
            discard_image(&state, profile_pic.as_deref()).await;
            return Err(e);
        }
    };

    info!("Registered user {}", user.id);
    let issued = state.tokens.issue(user.id);
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user,
            token: issued.token,
            expires_at: issued.expires_at,
        }),
    ))
}

async fn create_account(
    state: &AppState,
    email: String,
    password: String,
    name: String,
    profile_pic: Option<String>,
) -> Result<User, ApiError> {
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    let user = state
        .db
        .create_user(NewUser {
            email,
            password_hash,
            name,
            profile_pic,
        })
        .await?;
    Ok(user)
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = required(req.email, "email")?;
    let password = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation("password is required".to_string()))?;

    let Some(user) = state.db.find_user_by_email(&email).await? else {
        warn!("Login attempt for unknown email");
        return Err(AuthError::InvalidCredentials.into());
    };

    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    if !valid {
        warn!("Failed login for user {}", user.id);
        return Err(AuthError::InvalidCredentials.into());
    }

    let issued = state.tokens.issue(user.id);
    Ok(Json(AuthResponse {
        user,
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<User>, ApiError> {
    let user = state
        .db
        .find_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_register_login_me() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(test_state(tmp.path()).await);

        let (token, user_id) = register(app.clone(), "Coach@Example.com").await;

        let (status, json) = send(app.clone(), "GET", "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["id"], user_id);
        assert_eq!(json["email"], "coach@example.com");
        assert!(json.get("passwordHash").is_none());

        let (status, json) = send(
            app,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "coach@example.com", "password": "hunter22"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["user"]["id"], user_id);
        assert!(json["token"].as_str().is_some());
        assert!(json["expiresAt"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_and_keeps_original() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path()).await;
        let app = build_router(state.clone());

        let (token, user_id) = register(app.clone(), "coach@example.com").await;

        let (status, json) = send(
            app.clone(),
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({"email": "COACH@example.com", "password": "other", "name": "Impostor"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "CONFLICT");
        assert_eq!(state.db.count_users().await.unwrap(), 1);

        let (status, json) = send(app, "GET", "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["id"], user_id);
        assert_eq!(json["name"], "Coach");
    }

    #[tokio::test]
    async fn test_register_requires_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(test_state(tmp.path()).await);

        for body in [
            json!({"password": "x", "name": "Coach"}),
            json!({"email": "a@b.c", "name": "Coach"}),
            json!({"email": "a@b.c", "password": "x", "name": "  "}),
            json!({"email": "not-an-email", "password": "x", "name": "Coach"}),
        ] {
            let (status, json) =
                send(app.clone(), "POST", "/api/v1/auth/register", None, Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(test_state(tmp.path()).await);

        let resp = tower::util::ServiceExt::oneshot(
            app,
            axum::http::Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header("content-type", "application/json")
                .body(axum::body::Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(test_state(tmp.path()).await);
        register(app.clone(), "coach@example.com").await;

        for body in [
            json!({"email": "coach@example.com", "password": "wrong"}),
            json!({"email": "nobody@example.com", "password": "hunter22"}),
        ] {
            let (status, json) = send(app.clone(), "POST", "/api/v1/auth/login", None, Some(body)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(json["error"]["message"], "Invalid credentials");
        }
    }

    #[tokio::test]
    async fn test_me_requires_valid_token() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(test_state(tmp.path()).await);

        let (status, json) = send(app.clone(), "GET", "/api/v1/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "UNAUTHORIZED");

        let (status, _) = send(app, "GET", "/api/v1/auth/me", Some("1.9999999999.deadbeef"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_with_profile_picture() {
        let tmp = tempfile::tempdir().unwrap();
        let app = build_router(test_state(tmp.path()).await);

        let (status, json) = send_multipart(
            app,
            "/api/v1/auth/register",
            None,
            &[("email", "pic@example.com"), ("password", "hunter22"), ("name", "Coach")],
            Some(("me.png", "image/png", &b"\x89PNG fake"[..])),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", json);

        let path = json["user"]["profilePic"].as_str().unwrap();
        assert!(path.starts_with("/uploads/"));
        let stored = tmp.path().join(path.trim_start_matches("/uploads/"));
        assert_eq!(std::fs::read(stored).unwrap(), b"\x89PNG fake");
    }

    #[tokio::test]
    async fn test_register_rejects_bad_uploads() {
        let tmp = tempfile::tempdir().unwrap();
        let state = test_state(tmp.path()).await;
        let app = build_router(state.clone());
        let fields = [("email", "pic@example.com"), ("password", "hunter22"), ("name", "Coach")];

        let (status, json) = send_multipart(
            app.clone(),
            "/api/v1/auth/register",
            None,
            &fields,
            Some(("notes.txt", "text/plain", &b"hello"[..])),
        )
        .await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json["error"]["code"], "UPLOAD_REJECTED");

        // Test store caps uploads at 1 KiB
        let big = vec![0u8; 2048];
        let (status, json) = send_multipart(
            app,
            "/api/v1/auth/register",
            None,
            &fields,
            Some(("big.png", "image/png", big.as_slice())),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["error"]["code"], "UPLOAD_REJECTED");

        assert_eq!(state.db.count_users().await.unwrap(), 0);
    }
}
