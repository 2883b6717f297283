//! The edit-user form. Email is the identity key and stays read-only; only the
//! phone is checked remotely.
use tracing::info;

use super::image::resolve_image;
use super::{FieldStatus, FormError, FormFields, all_present};
use crate::api::UserApi;
use crate::error::Result;
use crate::model::{PhoneCheck, User};
use crate::storage::LocalStore;
use crate::store::{UserAction, UserStore};

const LABELS: &[&str] = &["First name", "Last name", "Email", "Phone", "New image (path or URL)"];
const EMAIL_FIELD: usize = 2;

#[derive(Clone, Debug, Default)]
pub struct EditUserForm {
    pub original_email: String,
    pub id: Option<u64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    /// Image kept unless a new source is typed.
    pub current_image: Option<String>,
    pub image_source: String,
    pub focus: usize,
    pub phone_status: FieldStatus,
    pub submitting: bool,
    /// Ticket of the submission in flight.
    pub ticket: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditDraft {
    pub original_email: String,
    pub user: User,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Updated(User),
    PhoneRejected,
}

impl EditUserForm {
    /// Prefill from the persisted record, or from the in-memory list for a
    /// user that only exists remotely.
    pub fn load(email: &str, storage: &LocalStore, store: &UserStore) -> Option<Self> {
        let user = storage.find(email).or_else(|| store.find_by_email(email).cloned())?;
        Some(Self::from_user(&user))
    }

    pub fn from_user(user: &User) -> Self {
        Self {
            original_email: user.email.clone(),
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            current_image: user.image.clone(),
            ..Self::default()
        }
    }

    pub fn begin_submit(&mut self) -> std::result::Result<EditDraft, FormError> {
        if self.submitting {
            return Err(FormError::AlreadySubmitting);
        }
        if !all_present(&[
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
        ]) {
            return Err(FormError::MissingFields("Please fill in all fields."));
        }
        let image = if self.image_source.trim().is_empty() {
            self.current_image.clone()
        } else {
            Some(resolve_image(&self.image_source)?)
        };
        self.submitting = true;
        Ok(EditDraft {
            original_email: self.original_email.clone(),
            user: User {
                id: self.id,
                first_name: self.first_name.trim().to_string(),
                last_name: self.last_name.trim().to_string(),
                email: self.original_email.clone(),
                phone: self.phone.trim().to_string(),
                image,
                is_new: true,
            },
        })
    }

    pub fn finish_submit(&mut self, check: &PhoneCheck) -> bool {
        self.phone_status = FieldStatus::from_valid(check.valid);
        self.submitting = false;
        check.valid
    }

    pub fn abort_submit(&mut self) {
        self.submitting = false;
    }
}

impl FormFields for EditUserForm {
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
            3 => Some(&mut self.phone),
            4 => Some(&mut self.image_source),
            _ => None,
        }
    }

    fn note(&self, idx: usize) -> &str {
        match idx {
            EMAIL_FIELD => "read-only",
            3 => self.phone_status.label(),
            _ => "",
        }
    }
}

pub async fn verify(api: &dyn UserApi, draft: &EditDraft) -> Result<PhoneCheck> {
    api.validate_phone(&draft.user.phone).await
}

/// Persist the edit and move the user to the front of the list as a local edit.
pub fn commit_edit(draft: EditDraft, store: &mut UserStore, storage: &LocalStore) -> Result<User> {
    let EditDraft { original_email, user } = draft;
    store.dispatch(UserAction::Remove { email: original_email.clone() });
    store.dispatch(UserAction::Add(user.clone()));
    storage.record_edited(&original_email, &user)?;
    info!(email = %user.email, "user updated");
    Ok(user)
}

pub async fn submit_edit(
    form: &mut EditUserForm,
    api: &dyn UserApi,
    store: &mut UserStore,
    storage: &LocalStore,
) -> Result<EditOutcome> {
    let draft = form.begin_submit()?;
    let check = match verify(api, &draft).await {
        Ok(c) => c,
        Err(e) => {
            form.abort_submit();
            return Err(e);
        }
    };
    if !form.finish_submit(&check) {
        return Ok(EditOutcome::PhoneRejected);
    }
    Ok(EditOutcome::Updated(commit_edit(draft, store, storage)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote() -> User {
        User {
            id: Some(4),
            first_name: "Jo".into(),
            last_name: "Ng".into(),
            email: "jo@x.io".into(),
            phone: "1".into(),
            image: Some("https://img/jo".into()),
            is_new: false,
        }
    }

    #[test]
    fn email_is_read_only() {
        let mut form = EditUserForm::from_user(&remote());
        form.set_focus(EMAIL_FIELD);
        form.insert_char('z');
        assert_eq!(form.email, "jo@x.io");
    }

    #[test]
    fn image_kept_when_no_new_source() {
        let mut form = EditUserForm::from_user(&remote());
        form.phone = "999".into();
        let draft = form.begin_submit().unwrap();
        assert_eq!(draft.user.image.as_deref(), Some("https://img/jo"));
        assert_eq!(draft.user.id, Some(4));
        assert!(draft.user.is_new);
    }

    #[test]
    fn cleared_phone_is_missing_field() {
        let mut form = EditUserForm::from_user(&remote());
        form.phone.clear();
        assert!(matches!(form.begin_submit(), Err(FormError::MissingFields(_))));
    }

    #[test]
    fn load_falls_back_to_store_entry() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStore::new(dir.path().join("users.json"));
        let mut store = UserStore::new();
        store.dispatch(UserAction::FetchFulfilled(crate::model::UserPage { users: vec![remote()], total: 1 }));
        let form = EditUserForm::load("jo@x.io", &storage, &store).unwrap();
        assert_eq!(form.first_name, "Jo");
        assert!(EditUserForm::load("nobody@x.io", &storage, &store).is_none());
    }
}
