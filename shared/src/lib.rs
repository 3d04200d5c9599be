use serde::{Deserialize, Deserializer, Serialize};

pub mod date;
pub mod protocol;

pub use date::{Date, Timestamp};

// =========================================================
// Constants
// =========================================================

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_EVENT_MANAGER: &str = "Event Manager";
pub const ROLE_EVENT_COORDINATOR: &str = "Event Coordinator";

/// Identity reported by the framework for an anonymous session.
pub const GUEST_USER: &str = "Guest";

/// Envelope message returned by a successful session login.
pub const LOGGED_IN_MESSAGE: &str = "Logged In";

/// Envelope message returned by a successful password change.
pub const PASSWORD_UPDATED_MESSAGE: &str = "password updated";

pub const HEADER_CSRF_TOKEN: &str = "X-Frappe-CSRF-Token";

/// Fields the server sends that the client does not model explicitly.
pub type Extra = serde_json::Map<String, serde_json::Value>;

// =========================================================
// Envelope
// =========================================================

/// The `{ "message": ... }` wrapper the framework puts around every RPC result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub message: Option<T>,
}

/// Paginated list payload: `{ data, total, page, total_pages }`.
///
/// Some endpoints answer with a bare array instead; that becomes the `data` with no paging info.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    bound(deserialize = "T: Deserialize<'de>"),
    from = "PagePayload<T>"
)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: Option<u32>,
    pub total_pages: Option<u32>,
}

#[derive(Deserialize)]
#[serde(untagged, bound(deserialize = "T: Deserialize<'de>"))]
enum PagePayload<T> {
    Bare(Vec<T>),
    Paged {
        #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
        data: Vec<T>,
        #[serde(default, deserialize_with = "null_as_default")]
        total: u64,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default)]
        total_pages: Option<u32>,
    },
}

impl<T> From<PagePayload<T>> for Page<T> {
    fn from(payload: PagePayload<T>) -> Self {
        match payload {
            PagePayload::Bare(data) => Self {
                data,
                ..Self::default()
            },
            PagePayload::Paged {
                data,
                total,
                page,
                total_pages,
            } => Self {
                data,
                total,
                page,
                total_pages,
            },
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            page: None,
            total_pages: None,
        }
    }
}

impl<T> Page<T> {
    /// Page number, falling back to the one that was requested.
    pub fn page_or(&self, requested: u32) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(requested)
    }

    pub fn total_pages_or_one(&self) -> u32 {
        self.total_pages.filter(|p| *p > 0).unwrap_or(1)
    }
}

/// Treats an explicit JSON `null` the same as a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =========================================================
// Session & Users
// =========================================================

/// The persisted user record.
///
/// Login only knows the submitted identifier and the display name, so everything else
/// arrives later through profile loads and is merged into `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl SessionUser {
    pub fn new(email: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            full_name: full_name.into(),
            ..Default::default()
        }
    }

    /// Overlays non-null profile fields onto this record.
    pub fn merge(&mut self, profile: &UserProfile) {
        if let Some(email) = profile.email.as_ref().filter(|e| !e.is_empty()) {
            self.email = email.clone();
        }
        if let Some(full_name) = profile.full_name.as_ref().filter(|n| !n.is_empty()) {
            self.full_name = full_name.clone();
        }
        if profile.first_name.is_some() {
            self.first_name = profile.first_name.clone();
        }
        if profile.last_name.is_some() {
            self.last_name = profile.last_name.clone();
        }
        for (key, value) in &profile.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub gifts_created: u64,
    #[serde(default)]
    pub gifts_issued: u64,
    #[serde(default)]
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentUserRole {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_event_manager: bool,
    #[serde(default)]
    pub is_event_coordinator: bool,
}

/// A user row in the settings screen.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ManagedUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub enabled: Option<i64>,
    /// The framework keeps the gift role in the user's `location` field.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleOption {
    pub name: String,
    #[serde(default)]
    pub role_name: Option<String>,
}

// =========================================================
// Gifts
// =========================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GiftImage {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Gift {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gift_name: Option<String>,
    #[serde(default)]
    pub gift_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub barcode_value: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<GiftImage>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Payload for create/update. Unknown form fields travel in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GiftDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_barcode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode_value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<GiftImage>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardTotals {
    #[serde(default)]
    pub total_gifts: u64,
    #[serde(default)]
    pub available_gifts: u64,
    #[serde(default)]
    pub issued_gifts: u64,
    #[serde(default)]
    pub total_value: f64,
    #[serde(default)]
    pub issued_value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub totals: DashboardTotals,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recent_activities: Vec<serde_json::Value>,
}

// =========================================================
// Categories
// =========================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// =========================================================
// Dispatches ("issues") & interests
// =========================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GiftIssue {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gift: Option<String>,
    #[serde(default)]
    pub gift_name: Option<String>,
    #[serde(default)]
    pub owner_full_name: Option<String>,
    #[serde(default)]
    pub emirates_id: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IssueDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift_recipient: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeliveryStatusUpdate {
    pub issue_name: String,
    pub status: String,
    pub delivery_note: Option<String>,
    pub delivery_description: Option<String>,
    pub delivery_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GiftInterest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gift: Option<String>,
    #[serde(default)]
    pub gift_recipient: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

// =========================================================
// Recipients
// =========================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GiftRecipient {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner_full_name: Option<String>,
    #[serde(default)]
    pub coordinator_full_name: Option<String>,
    #[serde(default)]
    pub coordinator_mobile_no: Option<String>,
    #[serde(default)]
    pub coordinator_emirates_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub person_photo: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Recipient form. Sent as multipart so a photo can ride along.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecipientDraft {
    pub owner_full_name: Option<String>,
    pub coordinator_full_name: Option<String>,
    pub coordinator_mobile_no: Option<String>,
    pub coordinator_emirates_id: Option<String>,
    pub address: Option<String>,
    pub person_photo: Option<FileBlob>,
}

// =========================================================
// Files
// =========================================================

/// Raw file content handed to multipart uploads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileBlob {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UploadedFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub is_private: Option<i64>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A row of any report; reports are rendered generically from column definitions.
pub type ReportRow = serde_json::Map<String, serde_json::Value>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_tolerates_missing_and_null_fields() {
        let page: Page<Gift> = serde_json::from_value(json!({ "data": null })).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.page_or(3), 3);
        assert_eq!(page.total_pages_or_one(), 1);
    }

    #[test]
    fn page_accepts_bare_array() {
        let page: Page<Gift> =
            serde_json::from_value(json!([{ "name": "G-1" }, { "name": "G-2" }])).unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.total, 0);
        assert_eq!(page.page_or(2), 2);
        assert_eq!(page.total_pages_or_one(), 1);
    }

    #[test]
    fn gift_keeps_unknown_fields() {
        let gift: Gift = serde_json::from_value(json!({
            "name": "GIFT-0001",
            "gift_name": "Falcon",
            "breed": "Saker",
            "images": [{ "image": "/files/a.png" }]
        }))
        .unwrap();
        assert_eq!(gift.gift_name.as_deref(), Some("Falcon"));
        assert_eq!(gift.extra.get("breed"), Some(&json!("Saker")));
        assert_eq!(gift.images.len(), 1);
    }

    #[test]
    fn merge_profile_overlays_non_empty_fields() {
        let mut user = SessionUser::new("a@b.com", "a@b.com");
        let profile: UserProfile = serde_json::from_value(json!({
            "full_name": "Ahmed Ali",
            "email": "",
            "phone": "0501234567"
        }))
        .unwrap();
        user.merge(&profile);
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.full_name, "Ahmed Ali");
        assert_eq!(user.extra.get("phone"), Some(&json!("0501234567")));
    }
}
