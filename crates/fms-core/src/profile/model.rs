//! Profile domain models.
//!
//! Wire names follow the backend (`phone`, `income`, `caste`, `category`,
//! `marks`); the camelCase model names are accepted as aliases.

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// Reservation category used by eligibility rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(try_from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum CasteCategory {
    #[default]
    General,
    #[strum(to_string = "OBC")]
    Obc,
    #[strum(to_string = "SC")]
    Sc,
    #[strum(to_string = "ST")]
    St,
}

impl TryFrom<String> for CasteCategory {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        trimmed.parse()
    }
}

impl From<CasteCategory> for String {
    fn from(value: CasteCategory) -> Self {
        value.to_string()
    }
}

/// Religious/linguistic minority status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(try_from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum MinorityStatus {
    Minority,
    #[default]
    #[strum(to_string = "Not Minority", serialize = "NotMinority", serialize = "not_minority")]
    NotMinority,
}

impl TryFrom<String> for MinorityStatus {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        trimmed.parse()
    }
}

impl From<MinorityStatus> for String {
    fn from(value: MinorityStatus) -> Self {
        value.to_string()
    }
}

/// The single profile record owned by an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,

    #[serde(
        rename = "phone",
        alias = "phoneNumber",
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone_number: Option<String>,

    #[serde(
        rename = "income",
        alias = "annualIncome",
        default,
        deserialize_with = "lenient_number"
    )]
    pub annual_income: f64,

    #[serde(rename = "caste", alias = "casteCategory", default)]
    pub caste_category: CasteCategory,

    #[serde(rename = "category", alias = "minorityStatus", default)]
    pub minority_status: MinorityStatus,

    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub course: String,

    #[serde(
        rename = "marks",
        alias = "marksPercentage",
        default,
        deserialize_with = "lenient_number"
    )]
    pub marks_percentage: f64,
}

impl Profile {
    /// Returns true when the required fields are filled in.
    pub fn has_required_fields(&self) -> bool {
        [&self.name, &self.state, &self.course]
            .iter()
            .all(|v| !v.trim().is_empty())
    }
}

/// What the client knows about whether eligibility can be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileCompleteness {
    /// No fetch or save has completed in this session yet.
    #[default]
    Unknown,
    /// The backend reported no saved profile for this identity.
    Missing,
    Complete,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// Accepts a number, a numeric string, an empty string or null.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(0.0),
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("number out of range")),
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(0.0),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| D::Error::custom(format!("invalid number '{}': {}", s, e))),
        other => Err(D::Error::custom(format!("expected number, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_backend_shape() {
        let profile: Profile = serde_json::from_value(json!({
            "name": "Asha",
            "phone": "9999999999",
            "income": 50000,
            "caste": "SC",
            "category": "Not Minority",
            "state": "Bihar",
            "course": "B.Sc",
            "marks": 82.5,
            "updatedAt": "2024-01-01T00:00:00"
        }))
        .unwrap();

        assert_eq!(profile.caste_category, CasteCategory::Sc);
        assert_eq!(profile.minority_status, MinorityStatus::NotMinority);
        assert_eq!(profile.annual_income, 50000.0);
        assert_eq!(profile.marks_percentage, 82.5);
        assert_eq!(profile.phone_number.as_deref(), Some("9999999999"));
    }

    #[test]
    fn test_deserialize_camel_case_aliases() {
        let profile: Profile = serde_json::from_value(json!({
            "name": "Ravi",
            "phoneNumber": "",
            "annualIncome": "120000",
            "casteCategory": "obc",
            "minorityStatus": "Minority",
            "state": "Kerala",
            "course": "B.Tech",
            "marksPercentage": ""
        }))
        .unwrap();

        assert_eq!(profile.caste_category, CasteCategory::Obc);
        assert_eq!(profile.minority_status, MinorityStatus::Minority);
        assert_eq!(profile.annual_income, 120000.0);
        assert_eq!(profile.marks_percentage, 0.0);
        assert!(profile.phone_number.is_none());
    }

    #[test]
    fn test_missing_optional_fields_take_defaults() {
        let profile: Profile = serde_json::from_value(json!({
            "name": "Asha",
            "caste": "",
            "state": "Bihar",
            "course": "B.Sc"
        }))
        .unwrap();

        assert_eq!(profile.annual_income, 0.0);
        assert_eq!(profile.caste_category, CasteCategory::General);
        assert_eq!(profile.minority_status, MinorityStatus::NotMinority);
        assert_eq!(profile.marks_percentage, 0.0);
        assert!(profile.has_required_fields());
    }

    #[test]
    fn test_serialize_uses_backend_names() {
        let profile: Profile = serde_json::from_value(json!({
            "name": "Asha", "state": "Bihar", "course": "B.Sc", "caste": "ST"
        }))
        .unwrap();
        let value = serde_json::to_value(&profile).unwrap();

        assert_eq!(value["caste"], "ST");
        assert_eq!(value["category"], "Not Minority");
        assert_eq!(value["income"], 0.0);
        assert!(value.get("phone").is_none());
    }

    #[test]
    fn test_unknown_caste_is_rejected() {
        let result: Result<Profile, _> = serde_json::from_value(json!({
            "name": "Asha", "state": "Bihar", "course": "B.Sc", "caste": "Other"
        }));
        assert!(result.is_err());
    }
}
