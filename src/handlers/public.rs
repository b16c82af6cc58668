use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::Deserialize;
use serde_json::json;
use std::io::ErrorKind;
use tracing::info;

use crate::db::{NewContact, RESUME_FILE};
use crate::error::PortfolioError;
use crate::middleware::client::ClientMeta;
use crate::router::PortfolioState;
use crate::service::stats::StatsField;

const VISITOR_COOKIE: &str = "visitor";
const MAX_NAME_CHARS: usize = 100;
const MAX_EMAIL_CHARS: usize = 254;
const MAX_MESSAGE_CHARS: usize = 5000;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ContactRequest {
    /// Trim and check the submission, attaching who sent it.
    pub fn validate(self, client: ClientMeta) -> Result<NewContact, PortfolioError> {
        let name = required(self.name, "Name", MAX_NAME_CHARS)?;
        let email = required(self.email, "Email", MAX_EMAIL_CHARS)?;
        let message = required(self.message, "Message", MAX_MESSAGE_CHARS)?;
        if !looks_like_email(&email) {
            return Err(PortfolioError::validation(
                "Please provide a valid email address",
            ));
        }
        Ok(NewContact {
            name,
            email,
            message,
            ip_address: client.ip,
            user_agent: client.user_agent,
        })
    }
}

fn required(
    value: Option<String>,
    field: &str,
    max_chars: usize,
) -> Result<String, PortfolioError> {
    let value = value.as_deref().map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(PortfolioError::validation(format!("{field} is required")));
    }
    if value.chars().count() > max_chars {
        return Err(PortfolioError::validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(value.to_string())
}

fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !s.chars().any(char::is_whitespace)
}

/// POST /api/contact -> stores a contact-form message.
pub async fn submit_contact(
    State(state): State<PortfolioState>,
    client: ClientMeta,
    body: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PortfolioError> {
    let Json(req) = body.map_err(|_| PortfolioError::validation("Invalid request body"))?;
    let contact = req.validate(client)?;

    let id = state.store.insert_contact(contact).await?;
    state.stats.increment(StatsField::TotalContacts, 1).await;
    info!(id, "contact message received");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Message sent successfully", "id": id })),
    ))
}

/// GET /api/download/resume -> serves the resume and records the download.
pub async fn download_resume(
    State(state): State<PortfolioState>,
    client: ClientMeta,
) -> Result<impl IntoResponse, PortfolioError> {
    let path = state.static_dir().join(RESUME_FILE);
    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => PortfolioError::NotFound("Resume"),
        _ => PortfolioError::Io(e),
    })?;

    state
        .store
        .log_download(client.ip, client.user_agent, RESUME_FILE)
        .await?;
    state.stats.increment(StatsField::TotalDownloads, 1).await;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{RESUME_FILE}\""),
            ),
        ],
        bytes,
    ))
}

/// POST /api/track/pageview -> counts a page view, and a unique visitor on first sight.
pub async fn track_page_view(
    State(state): State<PortfolioState>,
    jar: PrivateCookieJar,
) -> impl IntoResponse {
    state.stats.increment(StatsField::PageViews, 1).await;

    let jar = if jar.get(VISITOR_COOKIE).is_some() {
        jar
    } else {
        state.stats.increment(StatsField::UniqueVisitors, 1).await;
        let mut id = [0u8; 16];
        OsRng.fill_bytes(&mut id);
        let value = id.iter().map(|b| format!("{b:02x}")).collect::<String>();
        jar.add(state.long_lived_cookie(VISITOR_COOKIE, value))
    };

    (jar, Json(json!({ "success": true })))
}

/// GET /api/health -> store diagnostics; 503 when the store is unreachable.
pub async fn health(State(state): State<PortfolioState>) -> impl IntoResponse {
    let report = state.store.health_check().await;
    let status = if report.is_connected() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            message: Some(message.to_string()),
        }
    }

    #[test]
    fn valid_submission_is_trimmed() {
        let client = ClientMeta {
            ip: Some("198.51.100.4".into()),
            user_agent: None,
        };
        let c = request("  Ada ", "ada@example.com", " hi ")
            .validate(client)
            .unwrap();
        assert_eq!(c.name, "Ada");
        assert_eq!(c.message, "hi");
        assert_eq!(c.ip_address.as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn missing_or_blank_fields_are_rejected() {
        let missing = ContactRequest {
            name: None,
            email: Some("a@b.co".into()),
            message: Some("x".into()),
        };
        assert!(matches!(
            missing.validate(ClientMeta::default()),
            Err(PortfolioError::Validation(_))
        ));
        assert!(request("Ada", "ada@example.com", "   ")
            .validate(ClientMeta::default())
            .is_err());
    }

    #[test]
    fn oversized_fields_are_rejected() {
        let long = "m".repeat(MAX_MESSAGE_CHARS + 1);
        assert!(request("Ada", "ada@example.com", &long)
            .validate(ClientMeta::default())
            .is_err());
    }

    #[test]
    fn email_shape_is_checked() {
        for bad in ["ada", "ada@", "@example.com", "ada@example", "ada@.com", "a b@x.io", "a@b@c.io"] {
            assert!(!looks_like_email(bad), "{bad}");
        }
        assert!(looks_like_email("ada@example.com"));
    }
}
