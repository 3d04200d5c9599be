//! 用户管理 (设置页)

use super::{Listing, failure, reply_message};
use crate::rpc::RpcClient;
use giftdesk_shared::protocol::{
    AvailableRolesRequest, CurrentUserRoleRequest, DeleteUserRequest, ListQuery, NameRef,
    SettingsUsersRequest, UpdateUserPasswordRequest, UpdateUserRequest,
};
use giftdesk_shared::{CurrentUserRole, Extra, ManagedUser, NewUser, RoleOption};
use serde_json::Value;
use std::rc::Rc;

/// 删除用户实际上是禁用
pub const MSG_DISABLED: &str = "User disabled successfully";

#[derive(Clone)]
pub struct UserApi {
    rpc: Rc<RpcClient>,
}

impl UserApi {
    pub fn new(rpc: Rc<RpcClient>) -> Self {
        Self { rpc }
    }

    pub async fn list(&self, query: ListQuery) -> Result<Listing<ManagedUser>, String> {
        let page = query.page.unwrap_or(1);
        self.rpc
            .call(&SettingsUsersRequest(query))
            .await
            .map(|p| Listing::from_page(p, page))
            .map_err(failure("users.list", "Failed to fetch users"))
    }

    pub async fn create(&self, user: NewUser) -> Result<Value, String> {
        self.rpc
            .call(&user)
            .await
            .map_err(failure("users.create", "Failed to create user"))
    }

    pub async fn update(&self, name: &str, fields: Extra) -> Result<Value, String> {
        let req = UpdateUserRequest {
            name: name.to_string(),
            fields,
        };
        self.rpc
            .call(&req)
            .await
            .map_err(failure("users.update", "Failed to update user"))
    }

    /// 管理员重置他人密码，不需要旧密码
    pub async fn update_password(&self, name: &str, new_password: &str) -> Result<Value, String> {
        let req = UpdateUserPasswordRequest {
            name: name.to_string(),
            new_password: new_password.to_string(),
        };
        self.rpc
            .call(&req)
            .await
            .map_err(failure("users.update_password", "Failed to update password"))
    }

    pub async fn delete(&self, name: &str) -> Result<String, String> {
        self.rpc
            .call(&DeleteUserRequest(NameRef::new(name)))
            .await
            .map(|reply| reply_message(&reply, MSG_DISABLED))
            .map_err(failure("users.delete", "Failed to disable user"))
    }

    pub async fn available_roles(&self) -> Result<Vec<RoleOption>, String> {
        self.rpc
            .call(&AvailableRolesRequest)
            .await
            .map_err(failure("users.available_roles", "Failed to fetch roles"))
    }

    pub async fn current_user_role(&self) -> Result<CurrentUserRole, String> {
        self.rpc
            .call(&CurrentUserRoleRequest)
            .await
            .map_err(failure("users.current_user_role", "Failed to fetch user role"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{rpc, url};
    use crate::request::HttpMethod;
    use serde_json::json;

    #[tokio::test]
    async fn test_delete_reports_disable() {
        let (mock, rpc) = rpc();
        let api = UserApi::new(rpc);
        mock.mock_response(HttpMethod::Post, &url("gift.api.delete_user"), 200, json!({}));
        assert_eq!(api.delete("a@b.com").await.unwrap(), MSG_DISABLED);
    }

    #[tokio::test]
    async fn test_roles_and_current_role() {
        let (mock, rpc) = rpc();
        let api = UserApi::new(rpc);
        mock.mock_response(
            HttpMethod::Get,
            &url("gift.api.get_available_roles"),
            200,
            json!({ "message": [{ "name": "Admin" }, { "name": "Event Manager" }] }),
        );
        mock.mock_response(
            HttpMethod::Get,
            &url("gift.api.get_current_user_role"),
            200,
            json!({ "message": { "user": "a@b.com", "role": "Admin", "is_admin": true } }),
        );

        let roles = api.available_roles().await.unwrap();
        assert_eq!(roles.len(), 2);
        let current = api.current_user_role().await.unwrap();
        assert!(current.is_admin);
        assert_eq!(current.role.as_deref(), Some("Admin"));
    }

    #[tokio::test]
    async fn test_password_update_body() {
        let (mock, rpc) = rpc();
        let api = UserApi::new(rpc);
        let path = url("gift.api.update_user_password");
        mock.mock_response(HttpMethod::Post, &path, 200, json!({ "message": "ok" }));
        api.update_password("a@b.com", "s3cret!").await.unwrap();
        assert_eq!(
            mock.last_request().unwrap().body,
            crate::request::RequestBody::Json(
                json!({ "name": "a@b.com", "new_password": "s3cret!" }).to_string()
            )
        );
    }
}
