use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Password policy. The source system disagreed with itself here: the server
/// accepted anything of length 6+, the front end demanded 8+ with character
/// classes. Both rules are kept and the choice is configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordPolicy {
    /// Length >= 6.
    Basic,
    /// Length >= 8 with lowercase, uppercase, digit and symbol.
    Strong,
}

impl PasswordPolicy {
    pub fn check(&self, password: &str) -> Result<(), String> {
        match self {
            PasswordPolicy::Basic => {
                if password.len() < 6 {
                    return Err("Password must be at least 6 characters long".into());
                }
                Ok(())
            }
            PasswordPolicy::Strong => {
                if password.len() < 8 {
                    return Err("Password must be at least 8 characters long".into());
                }
                if !password.chars().any(|c| c.is_ascii_lowercase()) {
                    return Err("Password must contain a lowercase letter".into());
                }
                if !password.chars().any(|c| c.is_ascii_uppercase()) {
                    return Err("Password must contain an uppercase letter".into());
                }
                if !password.chars().any(|c| c.is_ascii_digit()) {
                    return Err("Password must contain a digit".into());
                }
                if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
                    return Err("Password must contain a symbol".into());
                }
                Ok(())
            }
        }
    }
}
