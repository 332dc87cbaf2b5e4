//! Response classification for the backend HTTP API.
//!
//! Pure functions over status codes and body text, so every mapping can be
//! tested without a server.

use fms_core::error::{FmsError, Result};
use fms_core::profile::Profile;
use fms_core::reminder::{Reminder, SubscribeReceipt};
use fms_core::scholarship::Scholarship;
use serde_json::Value;
use std::time::Duration;

const MAX_DETAIL_LEN: usize = 200;

/// Maps a transport-level failure onto the error taxonomy.
///
/// Timeouts are checked first: a connect timeout is both a timeout and a
/// connect error, and must surface as `Timeout`.
pub fn classify_transport(err: &reqwest::Error, ceiling: Duration) -> FmsError {
    if err.is_timeout() {
        FmsError::Timeout { after: ceiling }
    } else if err.is_connect() || err.is_request() {
        FmsError::Unreachable(err.to_string())
    } else if err.is_decode() || err.is_body() {
        FmsError::server(None, format!("Malformed response: {}", err))
    } else {
        FmsError::Unreachable(err.to_string())
    }
}

/// Maps a non-success status onto the error taxonomy.
pub fn classify_status(status: u16, body: &str, resource: &str, ceiling: Duration) -> FmsError {
    match status {
        401 | 403 => FmsError::SessionExpired,
        404 => FmsError::not_found(resource, extract_detail(body).unwrap_or_default()),
        408 | 504 => FmsError::Timeout { after: ceiling },
        _ => FmsError::server(
            Some(status),
            extract_detail(body).unwrap_or_else(|| format!("HTTP {}", status)),
        ),
    }
}

/// Pulls a human-readable message out of an error body.
///
/// Looks at `detail` (string or validation list), then `error`, then
/// `message`, then falls back to the raw text.
pub fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        for key in ["detail", "error", "message"] {
            match map.get(key) {
                Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
                Some(Value::Array(items)) if !items.is_empty() => {
                    let joined = items
                        .iter()
                        .map(|item| match item.get("msg").and_then(Value::as_str) {
                            Some(msg) => msg.to_string(),
                            None => item.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join("; ");
                    return Some(joined);
                }
                _ => {}
            }
        }
    }

    Some(truncate(trimmed))
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_DETAIL_LEN {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX_DETAIL_LEN).collect();
        format!("{}…", cut)
    }
}

fn parse_json(body: &str) -> Result<Value> {
    serde_json::from_str(body)
        .map_err(|e| FmsError::server(None, format!("Malformed response: {}", e)))
}

fn looks_like_missing_profile(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("profile") && (lower.contains("not found") || lower.contains("complete"))
}

/// Parses a `GET /profiles/me` success body.
///
/// The backend answers 200 with `{"message": "Profile not found"}` when no
/// profile exists; that is reported as `NotFound`.
pub fn parse_profile(body: &str) -> Result<Profile> {
    let value = parse_json(body)?;

    if let Value::Object(map) = &value
        && !map.contains_key("name")
        && let Some(message) = map.get("message").and_then(Value::as_str)
        && message.to_lowercase().contains("not found")
    {
        return Err(FmsError::not_found("profile", "me"));
    }

    serde_json::from_value(value)
        .map_err(|e| FmsError::server(None, format!("Malformed profile: {}", e)))
}

/// Parses a `POST /profiles` success body.
///
/// Returns the echoed profile when the body is one, `None` for a bare
/// acknowledgement such as `{"status": "Profile saved"}`.
pub fn parse_saved_profile(body: &str) -> Option<Profile> {
    serde_json::from_str::<Profile>(body)
        .ok()
        .filter(Profile::has_required_fields)
}

/// Parses a `GET /scholarships/eligible` success body.
///
/// Accepts `{ "scholarships": [...] }` or a bare array. The backend reports
/// some failures inside a 200 body as `{ "error": ... }`.
pub fn parse_eligible(body: &str) -> Result<Vec<Scholarship>> {
    let value = parse_json(body)?;

    let list = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => {
            if let Some(error) = map.get("error").and_then(Value::as_str) {
                if looks_like_missing_profile(error) {
                    return Err(FmsError::ProfileIncomplete);
                }
                let detail = match map.get("details").and_then(Value::as_str) {
                    Some(details) => format!("{}: {}", error, details),
                    None => error.to_string(),
                };
                return Err(FmsError::server(None, detail));
            }
            map.remove("scholarships").ok_or_else(|| {
                FmsError::server(None, "Response has no scholarships field")
            })?
        }
        other => {
            return Err(FmsError::server(
                None,
                format!("Unexpected eligibility response: {}", truncate(&other.to_string())),
            ));
        }
    };

    serde_json::from_value(list)
        .map_err(|e| FmsError::server(None, format!("Malformed scholarship: {}", e)))
}

/// Parses a `GET /reminders/` success body (`{ "reminders": [...] }` or a bare array).
pub fn parse_reminders(body: &str) -> Result<Vec<Reminder>> {
    let value = parse_json(body)?;
    let list = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => map.remove("reminders").unwrap_or(Value::Array(Vec::new())),
        other => {
            return Err(FmsError::server(
                None,
                format!("Unexpected reminders response: {}", truncate(&other.to_string())),
            ));
        }
    };

    serde_json::from_value(list)
        .map_err(|e| FmsError::server(None, format!("Malformed reminder: {}", e)))
}

/// Parses a `POST /reminders/subscribe` success body.
///
/// `email_status` is either `{ "status": ... }` or a plain string.
pub fn parse_subscribe(body: &str) -> SubscribeReceipt {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return SubscribeReceipt::default();
    };

    let email_status = match value.get("email_status") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Object(map)) => map.get("status").and_then(Value::as_str).map(str::to_string),
        _ => None,
    };

    SubscribeReceipt {
        message: value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        email_status,
    }
}
