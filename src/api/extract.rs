//! Request extractors shared by the route handlers.

use std::fmt::Display;
use std::str::FromStr;

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::request::Parts;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::state::AppState;
use super::ApiError;
use crate::auth::AuthError;
use crate::models::UserId;

/// Multipart field carrying an uploaded image.
pub const IMAGE_FIELD: &str = "profilePic";

/// JSON body whose rejections use the API error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Path parameters whose rejections use the API error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

/// The user a valid bearer token was issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = state.tokens.verify(token)?;
        Ok(AuthUser(claims.user_id))
    }
}

/// An image part from a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Form fields that arrive either as JSON or as a multipart form with an
/// optional [`IMAGE_FIELD`] part.
///
/// Multipart text parts are collected into a JSON object of strings before
/// deserializing into `T`, so numeric fields should accept strings too (see
/// [`lenient`]).
#[derive(Debug)]
pub struct FormWithImage<T> {
    pub fields: T,
    pub image: Option<UploadedImage>,
}

#[async_trait]
impl<S, T> FromRequest<S> for FormWithImage<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let AppJson(fields) = AppJson::<T>::from_request(req, state).await?;
            return Ok(Self { fields, image: None });
        }

        let mut multipart = Multipart::from_request(req, state).await?;
        let mut text = serde_json::Map::new();
        let mut image = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == IMAGE_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was picked
                if !bytes.is_empty() {
                    image = Some(UploadedImage {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            } else {
                text.insert(name, Value::String(field.text().await?));
            }
        }

        let fields = serde_json::from_value(Value::Object(text))
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        Ok(Self { fields, image })
    }
}

/// Deserialize an optional value that may arrive as a JSON number or as a
/// string (form fields). Blank strings count as absent.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(de::Error::custom(format!(
                "expected a number or string, got {}",
                other
            )))
        }
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse().map(Some).map_err(de::Error::custom)
}

/// Trim a required text field, rejecting it when absent or blank.
pub fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("{} is required", field))),
    }
}
