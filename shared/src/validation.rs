//! Input validation functions
//!
//! This module provides validation utilities for account input.
//! Email syntax checks are delegated to the `validator` crate.

use validator::ValidateEmail;

/// Minimum length of a display name (in characters, after trimming)
pub const NAME_MIN_LEN: usize = 1;

/// Maximum length of a display name (in characters, after trimming)
pub const NAME_MAX_LEN: usize = 100;

/// Minimum password length
pub const PASSWORD_MIN_LEN: usize = 6;

/// Maximum password length
///
/// bcrypt only looks at the first 72 bytes; longer input is still accepted
/// up to this bound so argon2 can hash it in full.
pub const PASSWORD_MAX_LEN: usize = 128;

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    let len = name.trim().chars().count();
    if len < NAME_MIN_LEN {
        return Err("Name cannot be empty".to_string());
    }
    if len > NAME_MAX_LEN {
        return Err(format!("Name must be at most {} characters", NAME_MAX_LEN));
    }
    Ok(())
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    if !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        ));
    }
    if len > PASSWORD_MAX_LEN {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Map technical field names to user-friendly display labels
pub fn get_field_display_label(field_name: &str) -> &str {
    match field_name {
        "name" => "Name",
        "email" => "Email",
        "password" => "Password",
        "id" => "User ID",
        _ => field_name,
    }
}

/// Validation error with field context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub display_label: String,
}

impl ValidationError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            display_label: get_field_display_label(field).to_string(),
        }
    }

    /// Format as user-friendly error message
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.display_label, self.message)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for ValidationError {}

/// Run a field validator and attach the field name to its error
pub fn check_field(
    field: &str,
    result: Result<(), String>,
) -> Result<(), ValidationError> {
    result.map_err(|message| ValidationError::new(field, &message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case::valid("test@gmail.com", true)]
    #[case::valid_subdomain("user@mail.example.com", true)]
    #[case::no_at("testgmail.com", false)]
    #[case::no_domain("test@", false)]
    #[case::no_username("@gmail.com", false)]
    #[case::empty("", false)]
    #[case::just_at("@", false)]
    #[case::spaces("spaces in@email.com", false)]
    fn test_validate_email(#[case] email: &str, #[case] expected: bool) {
        assert_eq!(validate_email(email).is_ok(), expected, "email: {email}");
    }

    #[rstest]
    #[case::empty("", false)]
    #[case::single_char("A", true)]
    #[case::whitespace_only("   ", false)]
    #[case::padded_single_char(" A ", true)]
    #[case::unicode("Zoë", true)]
    fn test_validate_name(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(validate_name(name).is_ok(), expected, "name: {name:?}");
    }

    #[test]
    fn test_validate_name_max_length() {
        assert!(validate_name(&"a".repeat(NAME_MAX_LEN)).is_ok());
        assert!(validate_name(&"a".repeat(NAME_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"a".repeat(PASSWORD_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn test_validation_error() {
        let err = ValidationError::new("email", "Invalid email format");
        assert_eq!(err.field, "email");
        assert_eq!(err.display_label, "Email");
        assert_eq!(err.user_message(), "Email: Invalid email format");
        assert_eq!(err.to_string(), err.user_message());
    }

    #[test]
    fn test_check_field_attaches_field_name() {
        let err = check_field("password", validate_password("abc")).unwrap_err();
        assert_eq!(err.field, "password");
        assert!(err.message.contains("at least 6"));
        assert!(check_field("name", validate_name("Alice")).is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_password_length_valid(len in PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN) {
            let password: String = (0..len).map(|_| 'a').collect();
            prop_assert!(validate_password(&password).is_ok());
        }

        #[test]
        fn prop_password_too_short(len in 0usize..PASSWORD_MIN_LEN) {
            let password: String = (0..len).map(|_| 'a').collect();
            prop_assert!(validate_password(&password).is_err());
        }

        #[test]
        fn prop_name_length_valid(name in "[a-zA-Z]{1,100}") {
            prop_assert!(validate_name(&name).is_ok());
        }
    }
}
