//! Derivation of the visible user page: local edits first, query filter, fixed-size pages.
use crate::model::User;

pub const PAGE_SIZE: usize = 10;

/// Stable sort putting locally created/edited users first.
pub fn sort_local_first(users: &[User]) -> Vec<&User> {
    let mut sorted: Vec<&User> = users.iter().collect();
    sorted.sort_by_key(|u| !u.is_new);
    sorted
}

/// Case-insensitive substring match on "first last" or email.
pub fn matches_query(user: &User, query: &str) -> bool {
    let q = query.to_lowercase();
    user.full_name().to_lowercase().contains(&q) || user.email.to_lowercase().contains(&q)
}

pub fn filter_users<'a>(users: Vec<&'a User>, query: &str) -> Vec<&'a User> {
    if query.is_empty() {
        return users;
    }
    users.into_iter().filter(|u| matches_query(u, query)).collect()
}

pub fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

/// Items of 1-based `page`. Out-of-range pages (including 0) are empty.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = page.saturating_mul(page_size).min(items.len());
    &items[start..end]
}

/// One rendered page of the user list.
#[derive(Debug)]
pub struct ListView<'a> {
    pub rows: Vec<&'a User>,
    pub page: usize,
    pub total_pages: usize,
    /// Users matching the query across all pages.
    pub matched: usize,
}

pub fn visible_page<'a>(users: &'a [User], query: &str, page: usize) -> ListView<'a> {
    let filtered = filter_users(sort_local_first(users), query);
    let total_pages = page_count(filtered.len(), PAGE_SIZE);
    let rows = page_slice(&filtered, page, PAGE_SIZE).to_vec();
    ListView {
        rows,
        page,
        total_pages,
        matched: filtered.len(),
    }
}
