//! The login form. It only validates input locally; no credentials are checked.
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use super::FormFields;

/// Pause between an accepted login and entering the user list.
pub const LOGIN_DELAY: Duration = Duration::from_secs(1);

const LABELS: &[&str] = &["Email", "Password", "Confirm password"];
const EMAIL: usize = 0;
const PASSWORD: usize = 1;
const CONFIRM: usize = 2;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

pub fn is_valid_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}

#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub errors: [String; 3],
    pub touched: [bool; 3],
    pub focus: usize,
    pub submitting: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error text for one field, empty when the field is fine.
    pub fn validate_field(&self, idx: usize) -> String {
        let msg = match idx {
            EMAIL if self.email.is_empty() => "Email is required",
            EMAIL if !is_valid_email(&self.email) => "Invalid email format",
            PASSWORD if self.password.is_empty() => "Password is required",
            PASSWORD if self.password.chars().count() < 6 => "Password must be at least 6 characters",
            PASSWORD if !self.password.chars().any(|c| c.is_ascii_digit()) => "Password must contain a number",
            CONFIRM if self.confirm != self.password => "Passwords do not match",
            _ => "",
        };
        msg.to_string()
    }

    /// Validate and touch every field. True when the login may proceed.
    pub fn submit(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        for idx in 0..LABELS.len() {
            self.touched[idx] = true;
            self.errors[idx] = self.validate_field(idx);
        }
        let ok = self.errors.iter().all(String::is_empty);
        self.submitting = ok;
        ok
    }
}

impl FormFields for LoginForm {
    fn labels(&self) -> &'static [&'static str] {
        LABELS
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn set_focus(&mut self, idx: usize) {
        self.focus = idx;
    }

    fn value(&self, idx: usize) -> &str {
        match idx {
            EMAIL => &self.email,
            PASSWORD => &self.password,
            CONFIRM => &self.confirm,
            _ => "",
        }
    }

    fn value_mut(&mut self, idx: usize) -> Option<&mut String> {
        match idx {
            EMAIL => Some(&mut self.email),
            PASSWORD => Some(&mut self.password),
            CONFIRM => Some(&mut self.confirm),
            _ => None,
        }
    }

    fn is_secret(&self, idx: usize) -> bool {
        idx != EMAIL
    }

    fn note(&self, idx: usize) -> &str {
        self.errors.get(idx).map(String::as_str).unwrap_or("")
    }

    fn on_edit(&mut self, idx: usize) {
        if self.touched.get(idx).copied().unwrap_or(false) {
            self.errors[idx] = self.validate_field(idx);
        }
    }

    fn on_leave(&mut self, idx: usize) {
        if idx < LABELS.len() {
            self.touched[idx] = true;
            self.errors[idx] = self.validate_field(idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, pw: &str, confirm: &str) -> LoginForm {
        LoginForm {
            email: email.into(),
            password: pw.into(),
            confirm: confirm.into(),
            ..LoginForm::default()
        }
    }

    #[test]
    fn valid_input_is_accepted() {
        let mut f = form("a@b.co", "abc123", "abc123");
        assert!(f.submit());
        assert!(f.submitting);
        assert!(!f.submit(), "no resubmit while waiting");
    }

    #[test]
    fn password_rules() {
        assert_eq!(form("a@b.co", "", "").validate_field(PASSWORD), "Password is required");
        assert_eq!(form("a@b.co", "ab1", "").validate_field(PASSWORD), "Password must be at least 6 characters");
        assert_eq!(form("a@b.co", "abcdef", "").validate_field(PASSWORD), "Password must contain a number");
        assert_eq!(form("a@b.co", "abc123", "abc124").validate_field(CONFIRM), "Passwords do not match");
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.d"));
        assert_eq!(form("", "", "").validate_field(EMAIL), "Email is required");
    }

    #[test]
    fn errors_appear_on_leave_then_track_edits() {
        let mut f = LoginForm::new();
        f.insert_char('x');
        assert!(f.errors[EMAIL].is_empty(), "untouched field stays quiet");
        f.focus_next();
        assert_eq!(f.errors[EMAIL], "Invalid email format");
        f.focus_prev();
        for c in "@y.io".chars() {
            f.insert_char(c);
        }
        assert!(f.errors[EMAIL].is_empty());
    }

    #[test]
    fn failed_submit_touches_everything() {
        let mut f = form("bad", "abc", "x");
        assert!(!f.submit());
        assert!(f.touched.iter().all(|t| *t));
        assert!(!f.submitting);
    }
}
