//! Response schemas of the remote services.
//!
//! Payloads are decoded into these types and converted to domain types right
//! away; nothing past this module sees raw JSON.
use serde::Deserialize;

use crate::model::{EmailCheck, PhoneCheck, User, UserPage};

#[derive(Debug, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<RemoteUser>,
    #[serde(default)]
    pub total: u64,
}

/// A listing entry. Fields beyond these are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<RemoteUser> for User {
    fn from(r: RemoteUser) -> Self {
        User {
            id: Some(r.id),
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            phone: r.phone,
            image: r.image,
            is_new: false,
        }
    }
}

impl From<UsersResponse> for UserPage {
    fn from(r: UsersResponse) -> Self {
        UserPage {
            users: r.users.into_iter().map(User::from).collect(),
            total: r.total,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Flag {
    #[serde(default)]
    pub value: Option<bool>,
}

impl Flag {
    fn is_set(flag: &Option<Flag>) -> bool {
        flag.as_ref().and_then(|f| f.value).unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
pub struct EmailValidationResponse {
    #[serde(default)]
    pub is_valid_format: Option<Flag>,
    #[serde(default)]
    pub is_mx_found: Option<Flag>,
}

impl From<EmailValidationResponse> for EmailCheck {
    fn from(r: EmailValidationResponse) -> Self {
        EmailCheck {
            valid_format: Flag::is_set(&r.is_valid_format),
            mx_found: Flag::is_set(&r.is_mx_found),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PhoneValidationResponse {
    #[serde(default)]
    pub valid: Option<bool>,
}

impl From<PhoneValidationResponse> for PhoneCheck {
    fn from(r: PhoneValidationResponse) -> Self {
        PhoneCheck {
            valid: r.valid.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_drops_extra_fields() {
        let raw = r#"{"users":[{"id":1,"firstName":"Emily","lastName":"Johnson","maidenName":"Smith","age":28,
            "email":"emily.johnson@x.dummyjson.com","phone":"+81 965-431-3024","image":"https://dummyjson.com/icon/emilys/128"}],
            "total":208,"skip":0,"limit":1}"#;
        let page: UserPage = serde_json::from_str::<UsersResponse>(raw).unwrap().into();
        assert_eq!(page.total, 208);
        assert_eq!(page.users[0].id, Some(1));
        assert_eq!(page.users[0].full_name(), "Emily Johnson");
        assert!(!page.users[0].is_new);
    }

    #[test]
    fn missing_email_flags_read_as_false() {
        let raw = r#"{"email":"x@y.z","is_valid_format":{"value":true,"text":"TRUE"}}"#;
        let check: EmailCheck = serde_json::from_str::<EmailValidationResponse>(raw).unwrap().into();
        assert!(check.valid_format);
        assert!(!check.mx_found);
        assert!(!check.is_valid());
    }

    #[test]
    fn phone_flag_defaults_to_invalid() {
        let check: PhoneCheck = serde_json::from_str::<PhoneValidationResponse>("{}").unwrap().into();
        assert!(!check.valid);
        let check: PhoneCheck =
            serde_json::from_str::<PhoneValidationResponse>(r#"{"phone":"123","valid":true}"#).unwrap().into();
        assert!(check.valid);
    }
}
