//! Field rules shared by projects, tasks, and subtasks.

use crate::accounts::{normalize_email, validate_email};
use crate::error::CoreError;

/// Maximum length of a node title.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Image used for projects created without one.
pub const DEFAULT_PROJECT_IMAGE: &str = "projects/default/project_d.png";

/// Validate a node title.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let len = title.trim().chars().count();
    if len == 0 {
        return Err(CoreError::Validation("title cannot be empty".into()));
    }
    if len > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Normalize a list of expert emails: validate syntax, lowercase domains,
/// and drop repeats while keeping the first occurrence's order.
pub fn normalize_expert_emails(emails: &[String]) -> Result<Vec<String>, CoreError> {
    let mut out: Vec<String> = Vec::with_capacity(emails.len());
    for raw in emails {
        let email = normalize_email(raw);
        validate_email(&email)?;
        if !out.contains(&email) {
            out.push(email);
        }
    }
    Ok(out)
}

/// Reject emails that already belong to the node's experts.
pub fn reject_existing_experts(requested: &[String], existing: &[String]) -> Result<(), CoreError> {
    if let Some(dup) = requested.iter().find(|e| existing.contains(e)) {
        return Err(CoreError::Validation(format!(
            "User with email {dup} already exists."
        )));
    }
    Ok(())
}

/// Build the not-found error for an expert email with no matching user.
pub fn unknown_user(email: &str) -> CoreError {
    CoreError::Validation(format!("User with email {email} not found."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn title_bounds() {
        assert!(validate_title("Website relaunch").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"t".repeat(MAX_TITLE_LENGTH + 1)).is_err());
    }

    #[test]
    fn expert_emails_deduplicated_in_order() {
        let emails = vec![
            "b@Example.com".to_string(),
            "a@example.com".to_string(),
            "b@example.COM".to_string(),
        ];
        assert_eq!(
            normalize_expert_emails(&emails).unwrap(),
            vec!["b@example.com".to_string(), "a@example.com".to_string()]
        );
    }

    #[test]
    fn invalid_expert_email_rejected() {
        assert!(normalize_expert_emails(&["nope".to_string()]).is_err());
    }

    #[test]
    fn existing_expert_rejected() {
        let existing = vec!["a@example.com".to_string()];
        assert_matches!(
            reject_existing_experts(&["a@example.com".to_string()], &existing),
            Err(CoreError::Validation(msg)) if msg.contains("a@example.com")
        );
        assert!(reject_existing_experts(&["c@example.com".to_string()], &existing).is_ok());
    }
}
