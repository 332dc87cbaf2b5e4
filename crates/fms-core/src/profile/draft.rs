//! Unvalidated profile input as collected by a form.

use serde::{Deserialize, Serialize};

use super::model::{CasteCategory, MinorityStatus, Profile};
use crate::error::{FmsError, Result};

/// Profile form input before validation.
///
/// Required fields are plain strings so an empty form can be represented;
/// everything else is optional and defaults on [`ProfileDraft::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub name: String,
    pub phone_number: Option<String>,
    pub annual_income: Option<f64>,
    pub caste_category: Option<CasteCategory>,
    pub minority_status: Option<MinorityStatus>,
    pub state: String,
    pub course: String,
    pub marks_percentage: Option<f64>,
}

impl ProfileDraft {
    /// Creates a draft with only the required fields set.
    pub fn new(name: impl Into<String>, state: impl Into<String>, course: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: state.into(),
            course: course.into(),
            ..Default::default()
        }
    }

    pub fn with_phone_number(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    pub fn with_annual_income(mut self, income: f64) -> Self {
        self.annual_income = Some(income);
        self
    }

    pub fn with_caste_category(mut self, caste: CasteCategory) -> Self {
        self.caste_category = Some(caste);
        self
    }

    pub fn with_minority_status(mut self, status: MinorityStatus) -> Self {
        self.minority_status = Some(status);
        self
    }

    pub fn with_marks_percentage(mut self, marks: f64) -> Self {
        self.marks_percentage = Some(marks);
        self
    }

    /// Validates the draft and fills in defaults.
    ///
    /// Fails with the first offending field. Text fields are trimmed.
    pub fn validate(&self) -> Result<Profile> {
        let name = required("name", &self.name)?;
        let state = required("state", &self.state)?;
        let course = required("course", &self.course)?;

        let annual_income = self.annual_income.unwrap_or(0.0);
        if !annual_income.is_finite() || annual_income < 0.0 {
            return Err(FmsError::validation(
                "annualIncome",
                "must be a number greater than or equal to 0",
            ));
        }

        let marks_percentage = self.marks_percentage.unwrap_or(0.0);
        if !marks_percentage.is_finite() || !(0.0..=100.0).contains(&marks_percentage) {
            return Err(FmsError::validation(
                "marksPercentage",
                "must be between 0 and 100",
            ));
        }

        let phone_number = self
            .phone_number
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        Ok(Profile {
            name,
            phone_number,
            annual_income,
            caste_category: self.caste_category.unwrap_or_default(),
            minority_status: self.minority_status.unwrap_or_default(),
            state,
            course,
            marks_percentage,
        })
    }
}

impl From<Profile> for ProfileDraft {
    fn from(profile: Profile) -> Self {
        Self {
            name: profile.name,
            phone_number: profile.phone_number,
            annual_income: Some(profile.annual_income),
            caste_category: Some(profile.caste_category),
            minority_status: Some(profile.minority_status),
            state: profile.state,
            course: profile.course,
            marks_percentage: Some(profile.marks_percentage),
        }
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FmsError::validation(field, "is required"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let profile = ProfileDraft::new("Asha", "Bihar", "B.Sc").validate().unwrap();

        assert_eq!(profile.name, "Asha");
        assert_eq!(profile.annual_income, 0.0);
        assert_eq!(profile.caste_category, CasteCategory::General);
        assert_eq!(profile.minority_status, MinorityStatus::NotMinority);
        assert_eq!(profile.marks_percentage, 0.0);
        assert!(profile.phone_number.is_none());
    }

    #[test]
    fn test_required_fields() {
        let err = ProfileDraft::new("  ", "Bihar", "B.Sc").validate().unwrap_err();
        assert_eq!(err, FmsError::validation("name", "is required"));

        let err = ProfileDraft::new("Asha", "", "B.Sc").validate().unwrap_err();
        assert!(matches!(err, FmsError::Validation { ref field, .. } if field == "state"));

        let err = ProfileDraft::new("Asha", "Bihar", "").validate().unwrap_err();
        assert!(matches!(err, FmsError::Validation { ref field, .. } if field == "course"));
    }

    #[test]
    fn test_marks_bounds() {
        let base = ProfileDraft::new("Asha", "Bihar", "B.Sc");
        assert!(base.clone().with_marks_percentage(0.0).validate().is_ok());
        assert!(base.clone().with_marks_percentage(100.0).validate().is_ok());
        assert!(base.clone().with_marks_percentage(100.5).validate().is_err());
        assert!(base.clone().with_marks_percentage(-1.0).validate().is_err());
        assert!(base.with_marks_percentage(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_negative_income_rejected() {
        let err = ProfileDraft::new("Asha", "Bihar", "B.Sc")
            .with_annual_income(-5.0)
            .validate()
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_trims_and_drops_blank_phone() {
        let profile = ProfileDraft::new(" Asha ", "Bihar", "B.Sc")
            .with_phone_number("   ")
            .validate()
            .unwrap();
        assert_eq!(profile.name, "Asha");
        assert!(profile.phone_number.is_none());
    }

    #[test]
    fn test_round_trip_through_draft() {
        let profile = ProfileDraft::new("Asha", "Bihar", "B.Sc")
            .with_caste_category(CasteCategory::Sc)
            .with_annual_income(50000.0)
            .validate()
            .unwrap();
        let again = ProfileDraft::from(profile.clone()).validate().unwrap();
        assert_eq!(profile, again);
    }
}
