//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest name accepted in the forced-winner queue.
const MAX_NAME_LEN: usize = 200;

/// Validates that every forced-winner name is non-blank and of reasonable length.
///
/// # Examples
///
/// ```ignore
/// validate_forced_names(&["Asha".into()])        // Ok
/// validate_forced_names(&["Asha".into(), " ".into()]) // Err - blank entry
/// ```
pub fn validate_forced_names(names: &[String]) -> Result<(), ValidationError> {
    if let Some(position) = names.iter().position(|name| name.trim().is_empty()) {
        let mut err = ValidationError::new("forced_name_blank");
        err.message = Some(format!("Forced winner #{} is blank", position + 1).into());
        return Err(err);
    }

    if let Some(name) = names.iter().find(|name| name.chars().count() > MAX_NAME_LEN) {
        let mut err = ValidationError::new("forced_name_length");
        err.message = Some(
            format!(
                "Forced winner names must be at most {MAX_NAME_LEN} characters (got {})",
                name.chars().count()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_forced_names_valid() {
        assert!(validate_forced_names(&["Asha".into(), "Ravi Kumar".into()]).is_ok());
        assert!(validate_forced_names(&[]).is_ok());
    }

    #[test]
    fn test_validate_forced_names_blank() {
        assert!(validate_forced_names(&["".into()]).is_err());
        assert!(validate_forced_names(&["Asha".into(), "  \t".into()]).is_err());
    }

    #[test]
    fn test_validate_forced_names_too_long() {
        assert!(validate_forced_names(&["x".repeat(MAX_NAME_LEN + 1)]).is_err());
        assert!(validate_forced_names(&["x".repeat(MAX_NAME_LEN)]).is_ok());
    }
}
