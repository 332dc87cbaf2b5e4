//! Scholarship domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A scholarship scored against the current profile by the backend.
///
/// Read-only on the client. `deadline` keeps the backend's text because
/// unknown deadlines arrive as free text such as "Not specified".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scholarship {
    #[serde(alias = "scholarship_id", alias = "id")]
    pub scholarship_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub amount: String,
    /// Eligibility score in `[0, 1]`.
    #[serde(default)]
    pub score: f64,
    /// Human-readable reasons, in the order the backend produced them.
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(alias = "apply_link", default)]
    pub apply_link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Scholarship {
    /// Parses `deadline` as an ISO date, if it is one.
    pub fn deadline_date(&self) -> Option<NaiveDate> {
        parse_deadline(&self.deadline)
    }

    /// Days from `today` until the deadline; negative once it has passed.
    pub fn days_until_deadline(&self, today: NaiveDate) -> Option<i64> {
        self.deadline_date().map(|d| (d - today).num_days())
    }
}

/// Where the displayed scholarship list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Returned by the eligibility query for the current profile.
    Live,
    /// Fixed demonstration content, never derived from the server.
    Demo,
}

/// The scholarship list currently applied to visible state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilitySnapshot {
    pub source: DataSource,
    pub scholarships: Vec<Scholarship>,
    pub fetched_at: DateTime<Utc>,
}

impl EligibilitySnapshot {
    pub fn is_demo(&self) -> bool {
        self.source == DataSource::Demo
    }

    pub fn ids(&self) -> Vec<&str> {
        self.scholarships
            .iter()
            .map(|s| s.scholarship_id.as_str())
            .collect()
    }

    pub fn find(&self, scholarship_id: &str) -> Option<&Scholarship> {
        self.scholarships
            .iter()
            .find(|s| s.scholarship_id == scholarship_id)
    }
}

pub(crate) fn parse_deadline(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // Some sources append a time component
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_backend_item() {
        let s: Scholarship = serde_json::from_value(json!({
            "scholarshipId": "nsp_sc_2024",
            "name": "Post Matric Scholarship for SC Students",
            "provider": "Ministry of Social Justice",
            "deadline": "2024-12-31",
            "amount": 25000,
            "score": 0.98,
            "reasons": ["Income ≤ ₹2.5L", "SC category"],
            "apply_link": "https://scholarships.gov.in",
            "icon": "🎓"
        }))
        .unwrap();

        assert_eq!(s.scholarship_id, "nsp_sc_2024");
        assert_eq!(s.amount, "25000");
        assert_eq!(s.apply_link, "https://scholarships.gov.in");
        assert_eq!(s.reasons, vec!["Income ≤ ₹2.5L", "SC category"]);
        assert!(s.description.is_none());
    }

    #[test]
    fn test_deadline_parsing() {
        let mut s: Scholarship = serde_json::from_value(json!({
            "scholarshipId": "x", "deadline": "2024-10-31"
        }))
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 10, 24).unwrap();
        assert_eq!(s.days_until_deadline(today), Some(7));

        s.deadline = "2024-10-31T23:59:00".to_string();
        assert_eq!(s.days_until_deadline(today), Some(7));

        s.deadline = "Not specified".to_string();
        assert_eq!(s.deadline_date(), None);
    }
}
