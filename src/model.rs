//! Domain types shared by the store, persistence, forms and views.
use serde::{Deserialize, Serialize};

/// A user record, either fetched from the remote directory or created/edited locally.
///
/// Email is the identity key across remote and local records. `is_new` marks
/// records created or edited on this machine; they sort ahead of remote ones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_new: bool,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Copy of this user carrying the local-edit flag.
    pub fn flagged(mut self) -> Self {
        self.is_new = true;
        self
    }
}

/// One page of the remote user listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: u64,
}

/// Result of the external email check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmailCheck {
    pub valid_format: bool,
    pub mx_found: bool,
}

impl EmailCheck {
    pub fn is_valid(&self) -> bool {
        self.valid_format && self.mx_found
    }
}

/// Result of the external phone check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhoneCheck {
    pub valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_shape_uses_camel_case_and_omits_missing_id() {
        let u = User {
            id: None,
            first_name: "Ana".into(),
            last_name: "Lee".into(),
            email: "ana@x.io".into(),
            phone: "555".into(),
            image: None,
            is_new: true,
        };
        let json = serde_json::to_value(&u).unwrap();
        assert_eq!(json["firstName"], "Ana");
        assert_eq!(json["isNew"], true);
        assert!(json.get("id").is_none());
    }

    #[test]
    fn missing_flag_and_null_image_read_as_defaults() {
        let u: User = serde_json::from_str(
            r#"{"firstName":"A","lastName":"B","email":"a@b.c","phone":"1","image":null}"#,
        )
        .unwrap();
        assert!(!u.is_new);
        assert_eq!(u.image, None);
    }

    #[test]
    fn email_check_needs_both_flags() {
        assert!(EmailCheck { valid_format: true, mx_found: true }.is_valid());
        assert!(!EmailCheck { valid_format: true, mx_found: false }.is_valid());
    }
}
