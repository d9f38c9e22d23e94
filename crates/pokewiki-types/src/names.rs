//! Username and page name validation.
//!
//! Both names end up as the last segment of an object store key, so they
//! must not be able to escape or restructure the key namespace:
//! - Must be non-empty and at most [`MAX_NAME_LEN`] characters
//! - Must not contain `/`, `\`, whitespace or control characters
//! - Must not contain `..` or be exactly `.`
//!
//! Page names may contain inner spaces (`"Mr. Mime"`) but not leading or
//! trailing whitespace.

use crate::error::TypeError;

/// Longest accepted username or page name, in characters.
pub const MAX_NAME_LEN: usize = 64;

/// Validate a username, returning `Ok(())` if valid.
///
/// ```
/// use pokewiki_types::validate_username;
///
/// assert!(validate_username("ash_ketchum").is_ok());
/// assert!(validate_username("").is_err());
/// assert!(validate_username("team/rocket").is_err());
/// ```
pub fn validate_username(name: &str) -> Result<(), TypeError> {
    let invalid = |reason: &str| TypeError::InvalidUsername {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    check_common(name).map_err(invalid)?;
    if name.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }
    Ok(())
}

/// Validate a page name, returning `Ok(())` if valid.
pub fn validate_page_name(name: &str) -> Result<(), TypeError> {
    let invalid = |reason: &str| TypeError::InvalidPageName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    check_common(name).map_err(invalid)?;
    if name.trim() != name {
        return Err(invalid("must not start or end with whitespace"));
    }
    if name.chars().any(|c| c.is_whitespace() && c != ' ') {
        return Err(invalid("must not contain tabs or newlines"));
    }
    Ok(())
}

fn check_common(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("must not be empty");
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err("too long");
    }
    if name.contains('/') || name.contains('\\') {
        return Err("must not contain slashes");
    }
    if name == "." || name.contains("..") {
        return Err("must not be '.' or contain '..'");
    }
    if name.chars().any(char::is_control) {
        return Err("must not contain control characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_usernames() {
        assert!(validate_username("misty").is_ok());
        assert!(validate_username("Brock99").is_ok());
        assert!(validate_username("gary.oak").is_ok());
    }

    #[test]
    fn invalid_usernames() {
        assert!(validate_username("").is_err());
        assert!(validate_username("two words").is_err());
        assert!(validate_username("../etc").is_err());
        assert!(validate_username(".").is_err());
        assert!(validate_username("a\\b").is_err());
        assert!(validate_username("nul\0").is_err());
        assert!(validate_username(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn page_names_allow_inner_spaces() {
        assert!(validate_page_name("Mr. Mime").is_ok());
        assert!(validate_page_name(" Mew").is_err());
        assert!(validate_page_name("Mew\t2").is_err());
        assert!(validate_page_name("pages/abra").is_err());
        assert!(validate_page_name(".").is_err());
        assert!(validate_page_name(".hidden").is_ok());
    }

    #[test]
    fn error_names_the_reason() {
        let err = validate_username("").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidUsername {
                name: String::new(),
                reason: "must not be empty".into()
            }
        );
    }
}
