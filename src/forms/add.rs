//! The add-user form: every field required, email and phone checked remotely.
use tracing::{debug, info};

use super::image::resolve_image;
use super::{FieldStatus, FormError, FormFields, all_present};
use crate::api::UserApi;
use crate::error::Result;
use crate::model::{EmailCheck, PhoneCheck, User};
use crate::storage::LocalStore;
use crate::store::{UserAction, UserStore};

const LABELS: &[&str] = &["First name", "Last name", "Email", "Phone", "Image (path or URL)"];

#[derive(Clone, Debug, Default)]
pub struct AddUserForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub image_source: String,
    pub focus: usize,
    pub email_status: FieldStatus,
    pub phone_status: FieldStatus,
    pub submitting: bool,
    /// Ticket of the submission in flight.
    pub ticket: u64,
}

/// Field values captured when a submission starts, image already resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub image: String,
}

impl NewUserDraft {
    pub fn into_user(self) -> User {
        User {
            id: None,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            image: Some(self.image),
            is_new: true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AddVerdict {
    pub email: EmailCheck,
    pub phone: PhoneCheck,
}

impl AddVerdict {
    pub fn is_valid(&self) -> bool {
        self.email.is_valid() && self.phone.valid
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddCommit {
    Added(User),
    /// The email is already in the list; nothing was changed.
    Duplicate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Added(User),
    Duplicate,
    Rejected { email: FieldStatus, phone: FieldStatus },
}

impl AddUserForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_submit(&mut self) -> std::result::Result<NewUserDraft, FormError> {
        if self.submitting {
            return Err(FormError::AlreadySubmitting);
        }
        if !all_present(&[
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
            self.image_source.as_str(),
        ]) {
            return Err(FormError::MissingFields("Please fill in all fields including image."));
        }
        let image = resolve_image(&self.image_source)?;
        self.submitting = true;
        Ok(NewUserDraft {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            image,
        })
    }

    /// Record the remote verdict; true when both checks passed.
    pub fn finish_submit(&mut self, verdict: &AddVerdict) -> bool {
        self.email_status = FieldStatus::from_valid(verdict.email.is_valid());
        self.phone_status = FieldStatus::from_valid(verdict.phone.valid);
        self.submitting = false;
        verdict.is_valid()
    }

    pub fn abort_submit(&mut self) {
        self.submitting = false;
    }
}

impl FormFields for AddUserForm {
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
            0 => &self.first_name,
            1 => &self.last_name,
            2 => &self.email,
            3 => &self.phone,
            4 => &self.image_source,
            _ => "",
        }
    }

    fn value_mut(&mut self, idx: usize) -> Option<&mut String> {
        match idx {
            0 => Some(&mut self.first_name),
            1 => Some(&mut self.last_name),
            2 => Some(&mut self.email),
            3 => Some(&mut self.phone),
            4 => Some(&mut self.image_source),
            _ => None,
        }
    }

    fn note(&self, idx: usize) -> &str {
        match idx {
            2 => self.email_status.label(),
            3 => self.phone_status.label(),
            _ => "",
        }
    }
}

/// Email first, then phone; both must come back for a verdict.
pub async fn verify(api: &dyn UserApi, draft: &NewUserDraft) -> Result<AddVerdict> {
    let email = api.validate_email(&draft.email).await?;
    debug!(email = %draft.email, valid = email.is_valid(), "email checked");
    let phone = api.validate_phone(&draft.phone).await?;
    debug!(phone = %draft.phone, valid = phone.valid, "phone checked");
    Ok(AddVerdict { email, phone })
}

/// Write a validated user through the store and the local slot.
pub fn commit_new_user(draft: NewUserDraft, store: &mut UserStore, storage: &LocalStore) -> Result<AddCommit> {
    if store.contains_email(&draft.email) {
        return Ok(AddCommit::Duplicate);
    }
    let user = draft.into_user();
    store.dispatch(UserAction::Add(user.clone()));
    storage.record_added(&user)?;
    info!(email = %user.email, "user added");
    Ok(AddCommit::Added(user))
}

/// Whole add flow in one call: start, verify, commit.
pub async fn submit_new_user(
    form: &mut AddUserForm,
    api: &dyn UserApi,
    store: &mut UserStore,
    storage: &LocalStore,
) -> Result<AddOutcome> {
    let draft = form.begin_submit()?;
    let verdict = match verify(api, &draft).await {
        Ok(v) => v,
        Err(e) => {
            form.abort_submit();
            return Err(e);
        }
    };
    if !form.finish_submit(&verdict) {
        return Ok(AddOutcome::Rejected {
            email: form.email_status,
            phone: form.phone_status,
        });
    }
    Ok(match commit_new_user(draft, store, storage)? {
        AddCommit::Added(user) => AddOutcome::Added(user),
        AddCommit::Duplicate => AddOutcome::Duplicate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> AddUserForm {
        AddUserForm {
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.com".into(),
            phone: "123".into(),
            image_source: "https://img.example/a.png".into(),
            ..AddUserForm::default()
        }
    }

    #[test]
    fn missing_image_blocks_submission() {
        let mut form = filled();
        form.image_source.clear();
        assert!(matches!(form.begin_submit(), Err(FormError::MissingFields(_))));
        assert!(!form.submitting);
    }

    #[test]
    fn second_submit_is_refused_while_in_flight() {
        let mut form = filled();
        form.begin_submit().unwrap();
        assert_eq!(form.begin_submit(), Err(FormError::AlreadySubmitting));
        form.abort_submit();
        assert!(form.begin_submit().is_ok());
    }

    #[test]
    fn verdict_sets_statuses() {
        let mut form = filled();
        form.begin_submit().unwrap();
        let ok = form.finish_submit(&AddVerdict {
            email: EmailCheck { valid_format: true, mx_found: true },
            phone: PhoneCheck { valid: false },
        });
        assert!(!ok);
        assert_eq!(form.email_status, FieldStatus::Valid);
        assert_eq!(form.phone_status.label(), "Invalid");
        assert!(!form.submitting);
    }

    #[test]
    fn typing_edits_focused_field() {
        let mut form = AddUserForm::new();
        form.insert_char('x');
        form.focus_next();
        form.insert_char('y');
        form.insert_char('z');
        form.backspace();
        assert_eq!(form.first_name, "x");
        assert_eq!(form.last_name, "y");
        form.focus_prev();
        form.focus_prev();
        assert_eq!(form.focus, 4);
    }
}
