use uuid::Uuid;

use crate::server::response::ApiError;

const MAX_USERNAME_LEN: usize = 40;
const MAX_REPO_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;
const MIN_PASSWORD_LEN: usize = 8;

fn is_valid_name_char(c: char, allow_period: bool) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || (allow_period && c == '.')
}

fn validate_name(
    name: &str,
    entity: &str,
    max_len: usize,
    allow_period: bool,
) -> Result<(), String> {
    if name.is_empty() {
        return Err(format!("{entity} name cannot be empty"));
    }
    if name.len() > max_len {
        return Err(format!("{entity} name cannot exceed {max_len} characters"));
    }
    if !name.chars().all(|c| is_valid_name_char(c, allow_period)) {
        let mut allowed = "alphanumeric characters, hyphens, and underscores".to_string();
        if allow_period {
            allowed.push_str(", and periods");
        }
        return Err(format!("{entity} name can only contain {allowed}"));
    }
    // Leading specials are reserved; this also rules out "." and ".."
    if name.starts_with('-') || name.starts_with('_') || name.starts_with('.') {
        return Err(format!(
            "{entity} name cannot start with a hyphen, underscore, or period"
        ));
    }
    Ok(())
}

/// Repository names double as directory names under the upload and
/// extraction trees, so the character set stays strict.
pub fn validate_repo_name(name: &str) -> Result<(), ApiError> {
    validate_name(name, "Repository", MAX_REPO_NAME_LEN, true).map_err(ApiError::bad_request)
}

pub fn validate_username(name: &str) -> Result<(), ApiError> {
    validate_name(name, "User", MAX_USERNAME_LEN, false).map_err(ApiError::bad_request)
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.len() < 3 || email.len() > MAX_EMAIL_LEN {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ApiError::bad_request("Invalid email address"));
    };
    if local.is_empty() || domain.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    Ok(())
}

/// Passwords need at least 8 characters, one digit, and one uppercase
/// letter.
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::bad_request(
            "Password must contain at least one digit",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ApiError::bad_request(
            "Password must contain at least one uppercase letter",
        ));
    }
    Ok(())
}

/// ID path parameters must be well-formed UUIDs where the route resolves
/// arbitrary client-supplied identifiers.
pub fn validate_id(id: &str, entity: &str) -> Result<(), ApiError> {
    Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| ApiError::bad_request(format!("Invalid {entity} ID format")))
}
