//! RPC endpoint descriptors.
//!
//! Each request type binds a fixed RPC path, an HTTP method and a response type. GET
//! requests are flattened into query parameters, everything else travels as a JSON body.

use crate::{
    Category, CategoryDraft, CurrentUserRole, DashboardStats, DeliveryStatusUpdate, Extra, Gift,
    GiftDraft, GiftInterest, GiftIssue, GiftRecipient, IssueDraft, ManagedUser, NewUser, Page,
    ProfileUpdate, RoleOption, UploadedFile, UserProfile, UserStats,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an RPC endpoint.
pub trait ApiRequest: Serialize {
    /// The payload inside the `{ message }` envelope (or the whole body, see `ENVELOPED`).
    type Response: DeserializeOwned;
    /// Dotted RPC path relative to the method base, or an absolute path starting with `/`.
    const PATH: &'static str;
    const METHOD: HttpMethod;
    /// `false` for endpoints whose interesting fields sit beside the envelope.
    const ENVELOPED: bool = true;
}

// =========================================================
// Shared query shapes
// =========================================================

/// Pagination, search and sort parameters shared by every list endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    /// Entity-specific filters such as `status` or `category`.
    #[serde(flatten)]
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Default::default()
        }
    }

    /// Adds a filter, ignoring empty values the way the list screens do.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.filters.insert(key.into(), value);
        }
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = (!term.is_empty()).then_some(term);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self.sort_order = Some(direction.into());
        self
    }
}

/// `{ name }` payload used by get/delete endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameRef {
    pub name: String,
}

impl NameRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// =========================================================
// Session
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub cmd: String,
    pub usr: String,
    pub pwd: String,
}

impl LoginRequest {
    pub fn new(usr: impl Into<String>, pwd: impl Into<String>) -> Self {
        Self {
            cmd: "login".to_string(),
            usr: usr.into(),
            pwd: pwd.into(),
        }
    }
}

/// The login reply carries `full_name` next to the envelope message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub home_page: Option<String>,
}

impl ApiRequest for LoginRequest {
    type Response = LoginResponse;
    const PATH: &'static str = "login";
    const METHOD: HttpMethod = HttpMethod::Post;
    const ENVELOPED: bool = false;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoutRequest {}

impl ApiRequest for LogoutRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "logout";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggedUserRequest;

impl ApiRequest for LoggedUserRequest {
    type Response = String;
    const PATH: &'static str = "frappe.auth.get_logged_user";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

impl ApiRequest for UpdatePasswordRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "frappe.core.doctype.user.user.update_password";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub user: String,
}

impl ApiRequest for ResetPasswordRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "frappe.core.doctype.user.user.reset_password";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentUserRoleRequest;

impl ApiRequest for CurrentUserRoleRequest {
    type Response = CurrentUserRole;
    const PATH: &'static str = "gift.api.get_current_user_role";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfileRequest;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileReply {
    #[serde(default)]
    pub user: UserProfile,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiRequest for UserProfileRequest {
    type Response = ProfileReply;
    const PATH: &'static str = "gift.api.get_user_profile";
    const METHOD: HttpMethod = HttpMethod::Get;
}

impl ApiRequest for ProfileUpdate {
    type Response = ProfileReply;
    const PATH: &'static str = "gift.api.update_user_profile";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStatsRequest;

impl ApiRequest for UserStatsRequest {
    type Response = UserStats;
    const PATH: &'static str = "gift.api.get_user_stats";
    const METHOD: HttpMethod = HttpMethod::Get;
}

// =========================================================
// Gifts
// =========================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListGiftsRequest(pub ListQuery);

impl ApiRequest for ListGiftsRequest {
    type Response = Page<Gift>;
    const PATH: &'static str = "gift.api.get_gifts";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetGiftRequest(pub NameRef);

impl ApiRequest for GetGiftRequest {
    type Response = Gift;
    const PATH: &'static str = "gift.api.get_gift";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftDetailsRequest {
    pub gift_name: String,
}

impl ApiRequest for GiftDetailsRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.gift.doctype.gift.gift.get_gift_details";
    const METHOD: HttpMethod = HttpMethod::Get;
}

impl ApiRequest for GiftDraft {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.create_gift";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateGiftRequest {
    pub name: String,
    #[serde(flatten)]
    pub draft: GiftDraft,
}

impl ApiRequest for UpdateGiftRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.update_gift";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteGiftRequest(pub NameRef);

impl ApiRequest for DeleteGiftRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.delete_gift";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftByCodeRequest {
    pub barcode_value: String,
}

impl ApiRequest for GiftByCodeRequest {
    type Response = Gift;
    const PATH: &'static str = "gift.api.get_gift_by_code";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStatsRequest;

impl ApiRequest for DashboardStatsRequest {
    type Response = DashboardStats;
    const PATH: &'static str = "gift.api.get_dashboard_stats";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GiftCategoriesRequest;

impl ApiRequest for GiftCategoriesRequest {
    type Response = Vec<Category>;
    const PATH: &'static str = "gift.api.get_categories";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenerateBarcodeRequest(pub NameRef);

impl ApiRequest for RegenerateBarcodeRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.regenerate_gift_barcode";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBarcodeRequest {
    pub gift_id: String,
    pub update_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_barcode_value: Option<String>,
}

impl ApiRequest for UpdateBarcodeRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.update_gift_barcode";
    const METHOD: HttpMethod = HttpMethod::Post;
}

// =========================================================
// Categories
// =========================================================

/// Generic doctype list through `frappe.client.get_list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocListRequest {
    pub doctype: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// JSON-encoded filter triples, e.g. `[["file_url","=","/files/a.png"]]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ApiRequest for DocListRequest {
    type Response = Vec<serde_json::Value>;
    const PATH: &'static str = "frappe.client.get_list";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsCategoriesRequest(pub ListQuery);

impl ApiRequest for SettingsCategoriesRequest {
    type Response = Page<Category>;
    const PATH: &'static str = "gift.api.get_settings_categories";
    const METHOD: HttpMethod = HttpMethod::Get;
}

impl ApiRequest for CategoryDraft {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.create_category";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: String,
    #[serde(flatten)]
    pub draft: CategoryDraft,
}

impl ApiRequest for UpdateCategoryRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.update_category";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCategoryRequest(pub NameRef);

impl ApiRequest for DeleteCategoryRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.delete_category";
    const METHOD: HttpMethod = HttpMethod::Post;
}

// =========================================================
// Dispatches
// =========================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListIssuesRequest(pub ListQuery);

impl ApiRequest for ListIssuesRequest {
    type Response = Page<GiftIssue>;
    const PATH: &'static str = "gift.api.get_gift_issues";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetIssueRequest(pub NameRef);

impl ApiRequest for GetIssueRequest {
    type Response = GiftIssue;
    const PATH: &'static str = "gift.api.get_gift_issue";
    const METHOD: HttpMethod = HttpMethod::Get;
}

impl ApiRequest for IssueDraft {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api_v2.create_gift_issue_v2";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateIssueRequest {
    pub name: String,
    #[serde(flatten)]
    pub draft: IssueDraft,
}

impl ApiRequest for UpdateIssueRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.update_gift_issue";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteIssueRequest(pub NameRef);

impl ApiRequest for DeleteIssueRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.delete_gift_issue";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchHistoryRequest {
    pub gift_id: String,
}

impl ApiRequest for DispatchHistoryRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.get_gift_dispatch_history";
    const METHOD: HttpMethod = HttpMethod::Get;
}

impl ApiRequest for DeliveryStatusUpdate {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.update_gift_delivery_status";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateEmiratesIdRequest {
    pub emirates_id: String,
}

impl ApiRequest for ValidateEmiratesIdRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.validate_emirates_id";
    const METHOD: HttpMethod = HttpMethod::Get;
}

// =========================================================
// Interests
// =========================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListInterestsRequest(pub ListQuery);

impl ApiRequest for ListInterestsRequest {
    type Response = Page<GiftInterest>;
    const PATH: &'static str = "gift.api.get_gift_interests";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetInterestRequest(pub NameRef);

impl ApiRequest for GetInterestRequest {
    type Response = GiftInterest;
    const PATH: &'static str = "gift.api.get_gift_interest";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateInterestRequest(pub Extra);

impl ApiRequest for CreateInterestRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api_v2.create_gift_interest_v2";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateInterestRequest {
    pub name: String,
    #[serde(flatten)]
    pub fields: Extra,
}

impl ApiRequest for UpdateInterestRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.update_gift_interest";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteInterestRequest(pub NameRef);

impl ApiRequest for DeleteInterestRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.delete_gift_interest";
    const METHOD: HttpMethod = HttpMethod::Post;
}

// =========================================================
// Users (settings)
// =========================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUsersRequest(pub ListQuery);

impl ApiRequest for SettingsUsersRequest {
    type Response = Page<ManagedUser>;
    const PATH: &'static str = "gift.api.get_settings_users";
    const METHOD: HttpMethod = HttpMethod::Get;
}

impl ApiRequest for NewUser {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.create_user";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    #[serde(flatten)]
    pub fields: Extra,
}

impl ApiRequest for UpdateUserRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.update_user";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserPasswordRequest {
    pub name: String,
    pub new_password: String,
}

impl ApiRequest for UpdateUserPasswordRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.update_user_password";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteUserRequest(pub NameRef);

impl ApiRequest for DeleteUserRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.delete_user";
    const METHOD: HttpMethod = HttpMethod::Post;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailableRolesRequest;

impl ApiRequest for AvailableRolesRequest {
    type Response = Vec<RoleOption>;
    const PATH: &'static str = "gift.api.get_available_roles";
    const METHOD: HttpMethod = HttpMethod::Get;
}

// =========================================================
// Recipients
// =========================================================

pub const PATH_CREATE_RECIPIENT: &str = "gift.api.create_gift_recipient";
pub const PATH_UPDATE_RECIPIENT: &str = "gift.api.update_gift_recipient";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsRecipientsRequest(pub ListQuery);

impl ApiRequest for SettingsRecipientsRequest {
    type Response = Page<GiftRecipient>;
    const PATH: &'static str = "gift.api.get_settings_gift_recipients";
    const METHOD: HttpMethod = HttpMethod::Get;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRecipientRequest(pub NameRef);

impl ApiRequest for DeleteRecipientRequest {
    type Response = serde_json::Value;
    const PATH: &'static str = "gift.api.delete_gift_recipient";
    const METHOD: HttpMethod = HttpMethod::Post;
}

// =========================================================
// Files
// =========================================================

pub const PATH_UPLOAD_FILE: &str = "upload_file";
pub const DEFAULT_UPLOAD_FOLDER: &str = "Home/Attachments";

/// REST resource path for a `File` document.
pub fn file_resource_path(name: &str) -> String {
    format!("/api/resource/File/{}", name)
}

/// Parses the `File` rows returned by a [`DocListRequest`].
pub fn uploaded_files(rows: Vec<serde_json::Value>) -> Vec<UploadedFile> {
    rows.into_iter()
        .filter_map(|row| serde_json::from_value(row).ok())
        .collect()
}
