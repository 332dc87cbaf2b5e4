//! Local checks on email/password input, run before the identity provider is called.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{FmsError, Result};

/// Minimum password length accepted by the identity provider.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(FmsError::validation("email", "is required"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(FmsError::validation("email", "is not a valid email address"));
    }
    Ok(())
}

pub fn validate_sign_in(email: &str, password: &str) -> Result<()> {
    validate_email(email)?;
    if password.is_empty() {
        return Err(FmsError::validation("password", "is required"));
    }
    Ok(())
}

pub fn validate_sign_up(email: &str, password: &str) -> Result<()> {
    validate_sign_in(email, password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FmsError::validation(
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("test@student.com").is_ok());
        assert!(validate_email("  asha@example.co.in ").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("asha").is_err());
        assert!(validate_email("asha@localhost").is_err());
        assert!(validate_email("a b@example.com").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_sign_in("test@student.com", "x").is_ok());
        assert!(validate_sign_in("test@student.com", "").is_err());
        assert!(validate_sign_up("test@student.com", "12345").is_err());
        assert!(validate_sign_up("test@student.com", "test1234").is_ok());
    }
}
