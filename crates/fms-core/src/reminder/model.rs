//! Reminder domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::scholarship::Scholarship;

/// An active deadline reminder for one (identity, scholarship) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub scholarship_id: String,
    #[serde(default)]
    pub scholarship_name: String,
    #[serde(default)]
    pub deadline: String,
    /// Address the reminder is delivered to.
    #[serde(alias = "email", default)]
    pub notify_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Reminder {
    /// Builds the reminder the backend creates for `scholarship`.
    pub fn for_scholarship(scholarship: &Scholarship, notify_email: impl Into<String>) -> Self {
        Self {
            scholarship_id: scholarship.scholarship_id.clone(),
            scholarship_name: scholarship.name.clone(),
            deadline: scholarship.deadline.clone(),
            notify_email: notify_email.into(),
            status: Some("active".to_string()),
        }
    }

    /// Reminders without a status are treated as active.
    pub fn is_active(&self) -> bool {
        self.status
            .as_deref()
            .is_none_or(|s| s.eq_ignore_ascii_case("active"))
    }

    pub fn deadline_date(&self) -> Option<NaiveDate> {
        crate::scholarship::parse_deadline(&self.deadline)
    }
}

/// Backend acknowledgement of a subscription request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubscribeReceipt {
    #[serde(default)]
    pub message: Option<String>,
    /// Delivery status of the confirmation email, e.g. "sent" or "failed".
    #[serde(default)]
    pub email_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_backend_reminder() {
        let r: Reminder = serde_json::from_value(json!({
            "id": "uid_sch_1",
            "userId": "uid",
            "scholarshipId": "sch_1",
            "scholarshipName": "Merit Scholarship",
            "deadline": "2024-12-31",
            "email": "asha@example.com",
            "status": "active",
            "type": "email"
        }))
        .unwrap();

        assert_eq!(r.scholarship_id, "sch_1");
        assert_eq!(r.notify_email, "asha@example.com");
        assert!(r.is_active());
        assert_eq!(r.deadline_date(), NaiveDate::from_ymd_opt(2024, 12, 31));
    }

    #[test]
    fn test_inactive_status() {
        let r: Reminder = serde_json::from_value(json!({
            "scholarshipId": "sch_1", "status": "cancelled"
        }))
        .unwrap();
        assert!(!r.is_active());
    }
}
