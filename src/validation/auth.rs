use crate::error::{CoreError, Result};

/// Validates a login before it is sent to the backend.
///
/// # Arguments
///
/// * `login` - The login to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the login is valid.
pub fn validate_login(login: &str) -> Result<()> {
    if login.is_empty() || login.len() < 3 {
        return Err(CoreError::Validation(
            "Login must be at least 3 characters long".to_string(),
        ));
    }

    if login.len() > 255 {
        return Err(CoreError::Validation(
            "Login must be at most 255 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates a password before it is sent to the backend.
///
/// # Arguments
///
/// * `password` - The password to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the password is valid.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(CoreError::Validation(
            "Password cannot be empty".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(CoreError::Validation(
            "Password must be at most 128 characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_login_is_rejected() {
        assert!(validate_login("ab").is_err());
        assert!(validate_login("student01").is_ok());
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(validate_password("").is_err());
        assert!(validate_password("secret").is_ok());
    }
}
