//! Form controllers for the login, add-user and edit-user screens.
//!
//! Each controller owns its field values and validation status. Network checks
//! are free functions taking a [`crate::api::UserApi`] so the UI can run them
//! off-thread and feed the verdict back with `finish_submit`.
pub mod add;
pub mod edit;
pub mod image;
pub mod login;

use std::fmt::{Display, Formatter};

/// Outcome of a remote check for one field, as shown next to it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FieldStatus {
    #[default]
    Unchecked,
    Valid,
    Invalid,
}

impl FieldStatus {
    pub fn from_valid(valid: bool) -> Self {
        if valid { Self::Valid } else { Self::Invalid }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldStatus::Unchecked => "",
            FieldStatus::Valid => "Valid",
            FieldStatus::Invalid => "Invalid",
        }
    }
}

/// Why a submission did not start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    MissingFields(&'static str),
    AlreadySubmitting,
    Image(String),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::MissingFields(msg) => write!(f, "{msg}"),
            FormError::AlreadySubmitting => write!(f, "a submission is already in progress"),
            FormError::Image(msg) => write!(f, "cannot use image: {msg}"),
        }
    }
}

impl std::error::Error for FormError {}

pub(crate) fn all_present(values: &[&str]) -> bool {
    values.iter().all(|v| !v.trim().is_empty())
}

/// Field navigation and text editing shared by the form screens.
pub trait FormFields {
    fn labels(&self) -> &'static [&'static str];
    fn focus(&self) -> usize;
    fn set_focus(&mut self, idx: usize);
    fn value(&self, idx: usize) -> &str;
    /// `None` for read-only fields.
    fn value_mut(&mut self, idx: usize) -> Option<&mut String>;

    fn is_secret(&self, _idx: usize) -> bool {
        false
    }

    /// Inline message displayed next to a field.
    fn note(&self, _idx: usize) -> &str {
        ""
    }

    fn on_edit(&mut self, _idx: usize) {}

    fn on_leave(&mut self, _idx: usize) {}

    fn focus_next(&mut self) {
        let cur = self.focus();
        self.on_leave(cur);
        self.set_focus((cur + 1) % self.labels().len());
    }

    fn focus_prev(&mut self) {
        let cur = self.focus();
        self.on_leave(cur);
        let n = self.labels().len();
        self.set_focus((cur + n - 1) % n);
    }

    fn insert_char(&mut self, c: char) {
        let idx = self.focus();
        if let Some(v) = self.value_mut(idx) {
            v.push(c);
            self.on_edit(idx);
        }
    }

    fn backspace(&mut self) {
        let idx = self.focus();
        if let Some(v) = self.value_mut(idx) {
            v.pop();
            self.on_edit(idx);
        }
    }
}
