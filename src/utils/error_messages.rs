//! Messages shown next to a field when one of its rules fails

pub const USERNAME_MIN_LENGTH: &str = "UserName should contain at least 3 characters";

pub const INVALID_DATE_OF_BIRTH: &str = "Invalid Date of Birth";

pub const EMAIL_REQUIRED: &str = "Email is required.";
pub const EMAIL_FORMAT: &str = "Invalid email format.";

pub const PASSWORD_REQUIRED: &str = "Password is required.";
pub const PASSWORD_MIN_LENGTH: &str = "Password should contain at least 8 characters.";
pub const PASSWORD_MAX_LENGTH: &str = "Password should contain at most 50 characters.";
pub const PASSWORD_DIGIT: &str = "Password should contain at least one digit.";
pub const PASSWORD_UPPERCASE: &str = "Password should contain at least one uppercase character.";
pub const PASSWORD_SPECIAL_SYMBOL: &str = "Password should contain at least one special symbol.";
pub const PASSWORD_NO_SPACES: &str = "Password cannot contain spaces.";

pub const PASSWORD_MISMATCH: &str = "Password did not match";

pub const POLICY_REQUIRED: &str = "Policy is required.";

/// Reported when a declared field has no value at all
pub const REQUIRED: &str = "Required";

/// Reported when a field receives the wrong primitive
pub fn type_mismatch(expected: impl std::fmt::Display, received: impl std::fmt::Display) -> String {
    format!("Expected {expected}, received {received}")
}
