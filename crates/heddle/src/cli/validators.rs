//! Parse-time validators for clap's `value_parser`.

use crate::config;
use crate::domain::{validate_title as validate_domain_title, MAX_TITLE_LENGTH};

/// Trim and validate an issue ID prefix.
pub fn validate_prefix(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    config::validate_prefix(trimmed).map_err(|e| e.to_string())?;
    Ok(trimmed.to_string())
}

/// Validate the shape of an issue ID: `prefix-suffix`.
///
/// The prefix follows [`validate_prefix`]; the suffix is one or more ASCII
/// letters or digits. Whether the issue exists is checked later.
pub fn validate_issue_id(s: &str) -> Result<String, String> {
    let s = s.trim();
    let Some((prefix, suffix)) = s.split_once('-') else {
        return Err(format!(
            "Invalid issue ID '{s}'. Expected format: prefix-suffix (e.g. hd-a3f8)"
        ));
    };

    config::validate_prefix(prefix).map_err(|e| format!("Issue ID: {e}"))?;

    if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!(
            "Invalid issue ID '{s}'. Suffix must be non-empty and alphanumeric"
        ));
    }

    Ok(s.to_string())
}

/// Trim a title and reject blank, multi-line or over-long input.
pub fn validate_title(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.contains(['\n', '\r']) {
        return Err("Title cannot contain newline characters".to_string());
    }
    validate_domain_title(s).map_err(|e| {
        if s.chars().count() > MAX_TITLE_LENGTH {
            format!("{e} (got {} characters)", s.chars().count())
        } else {
            e
        }
    })?;
    Ok(s.to_string())
}

/// Reject empty comment text.
pub fn validate_comment(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Comment cannot be empty".to_string());
    }
    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_prefix_is_trimmed() {
        assert_eq!(validate_prefix("  team ").unwrap(), "team");
    }

    #[rstest]
    #[case("hd-a3f8")]
    #[case("team42-0")]
    #[case("  hd-zz99  ")]
    fn test_issue_id_valid(#[case] id: &str) {
        assert_eq!(validate_issue_id(id).unwrap(), id.trim());
    }

    #[rstest]
    #[case::no_hyphen("hda3f8")]
    #[case::empty_suffix("hd-")]
    #[case::short_prefix("h-a3f8")]
    #[case::bad_suffix("hd-a3_f8")]
    #[case::empty("")]
    fn test_issue_id_invalid(#[case] id: &str) {
        assert!(validate_issue_id(id).is_err());
    }

    #[test]
    fn test_title_rules() {
        assert_eq!(validate_title("  Fix it ").unwrap(), "Fix it");
        assert!(validate_title("   ").is_err());
        assert!(validate_title("two\nlines").is_err());

        let err = validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).unwrap_err();
        assert!(err.contains("got 201 characters"), "unexpected: {err}");
    }

    #[test]
    fn test_comment_rules() {
        assert_eq!(validate_comment(" done ").unwrap(), "done");
        assert!(validate_comment(" ").is_err());
    }
}
