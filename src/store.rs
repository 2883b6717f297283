//! In-memory user state and its reducer.
//!
//! All mutations go through [`UserStore::dispatch`]. The store is owned by the
//! application state and handed to whoever needs it; there is no global.
use std::collections::HashSet;

use tracing::{debug, warn};

use crate::model::{User, UserPage};

/// Progress of the remote fetch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Rejected,
}

#[derive(Clone, Debug)]
pub enum UserAction {
    FetchPending,
    FetchFulfilled(UserPage),
    FetchRejected(String),
    Add(User),
    Remove { email: String },
}

#[derive(Clone, Debug, Default)]
pub struct UserStore {
    users: Vec<User>,
    total: u64,
    status: FetchStatus,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, action: UserAction) {
        match action {
            UserAction::FetchPending => self.status = FetchStatus::Pending,
            UserAction::FetchFulfilled(page) => {
                self.status = FetchStatus::Fulfilled;
                self.merge_fetched(page);
            }
            UserAction::FetchRejected(reason) => {
                self.status = FetchStatus::Rejected;
                warn!(%reason, "user fetch failed");
            }
            UserAction::Add(user) => {
                if self.contains_email(&user.email) {
                    debug!(email = %user.email, "add ignored, email already present");
                    return;
                }
                self.users.insert(0, user.flagged());
            }
            UserAction::Remove { email } => self.users.retain(|u| u.email != email),
        }
    }

    /// Prepend fetched users that are not already held, by id or by email.
    fn merge_fetched(&mut self, page: UserPage) {
        let mut ids: HashSet<u64> = self.users.iter().filter_map(|u| u.id).collect();
        let mut emails: HashSet<String> = self.users.iter().map(|u| u.email.clone()).collect();
        let incoming = page.users.len();
        let mut fresh: Vec<User> = Vec::with_capacity(incoming);
        for user in page.users {
            if user.id.is_some_and(|id| ids.contains(&id)) || emails.contains(&user.email) {
                continue;
            }
            if let Some(id) = user.id {
                ids.insert(id);
            }
            emails.insert(user.email.clone());
            fresh.push(user);
        }
        debug!(incoming, merged = fresh.len(), total = page.total, "merged fetched users");
        fresh.append(&mut self.users);
        self.users = fresh;
        self.total = page.total;
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Total reported by the last successful fetch.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Pending
    }

    pub fn contains_email(&self, email: &str) -> bool {
        self.users.iter().any(|u| u.email == email)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: Option<u64>, email: &str) -> User {
        User {
            id,
            first_name: "F".into(),
            last_name: "L".into(),
            email: email.into(),
            phone: "1".into(),
            image: None,
            is_new: false,
        }
    }

    fn emails(store: &UserStore) -> Vec<&str> {
        store.users().iter().map(|u| u.email.as_str()).collect()
    }

    #[test]
    fn pending_sets_loading_and_both_outcomes_clear_it() {
        let mut store = UserStore::new();
        assert_eq!(store.status(), FetchStatus::Idle);
        store.dispatch(UserAction::FetchPending);
        assert!(store.is_loading());
        store.dispatch(UserAction::FetchRejected("offline".into()));
        assert!(!store.is_loading());
        assert!(store.is_empty());
        assert_eq!(store.total(), 0);

        store.dispatch(UserAction::FetchPending);
        store.dispatch(UserAction::FetchFulfilled(UserPage { users: vec![user(Some(1), "a@x")], total: 30 }));
        assert!(!store.is_loading());
        assert_eq!(store.total(), 30);
    }

    #[test]
    fn repeats_inside_one_page_keep_the_first_entry() {
        let mut store = UserStore::new();
        let mut same_email = user(Some(3), "a@x");
        same_email.first_name = "Second".into();
        let mut same_id = user(Some(1), "c@x");
        same_id.first_name = "Third".into();
        store.dispatch(UserAction::FetchFulfilled(UserPage {
            users: vec![user(Some(1), "a@x"), same_email, same_id, user(Some(2), "b@x")],
            total: 4,
        }));
        assert_eq!(emails(&store), vec!["a@x", "b@x"]);
        assert_eq!(store.users()[0].id, Some(1));
        assert_eq!(store.users()[0].first_name, "F");
    }

    #[test]
    fn fetched_users_are_prepended_without_reordering_existing() {
        let mut store = UserStore::new();
        store.dispatch(UserAction::Add(user(None, "local@x")));
        store.dispatch(UserAction::FetchFulfilled(UserPage {
            users: vec![user(Some(1), "a@x"), user(Some(2), "b@x")],
            total: 2,
        }));
        assert_eq!(emails(&store), ["a@x", "b@x", "local@x"]);
    }

    #[test]
    fn repeated_fetch_does_not_duplicate() {
        let mut store = UserStore::new();
        let page = UserPage { users: vec![user(Some(1), "a@x"), user(Some(2), "b@x")], total: 2 };
        store.dispatch(UserAction::FetchFulfilled(page.clone()));
        store.dispatch(UserAction::FetchFulfilled(page));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn fetched_copy_of_local_edit_is_dropped() {
        let mut store = UserStore::new();
        let mut edited = user(Some(7), "a@x");
        edited.first_name = "Edited".into();
        store.dispatch(UserAction::Add(edited));
        store.dispatch(UserAction::FetchFulfilled(UserPage { users: vec![user(Some(7), "a@x")], total: 1 }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.users()[0].first_name, "Edited");
    }

    #[test]
    fn add_prepends_flagged_and_ignores_known_email() {
        let mut store = UserStore::new();
        store.dispatch(UserAction::Add(user(None, "a@x")));
        store.dispatch(UserAction::Add(user(None, "b@x")));
        store.dispatch(UserAction::Add(user(None, "a@x")));
        assert_eq!(emails(&store), ["b@x", "a@x"]);
        assert!(store.users().iter().all(|u| u.is_new));
    }

    #[test]
    fn add_then_remove_restores_content() {
        let mut store = UserStore::new();
        store.dispatch(UserAction::FetchFulfilled(UserPage {
            users: vec![user(Some(1), "a@x"), user(Some(2), "b@x")],
            total: 2,
        }));
        let before = store.users().to_vec();
        store.dispatch(UserAction::Add(user(None, "new@x")));
        store.dispatch(UserAction::Remove { email: "new@x".into() });
        assert_eq!(store.users(), before.as_slice());
    }
}
