//! 会话存储
//!
//! "谁登录了、能做什么" 的唯一来源。
//! 持久化的用户记录必须经过 [`SessionStore::check_auth`] 的服务端确认才会载入，在此之前视为未认证。

use crate::error::ApiError;
use crate::rpc::{AuthRecovery, RpcClient};
use crate::storage::{
    AUTH_KEYS, KEY_LAST_LOGIN, KEY_USER, KEY_USER_ROLE, KeyValueStore, KeyValueStoreExt,
};

use giftdesk_shared::protocol::{
    CurrentUserRoleRequest, LoggedUserRequest, LoginRequest, LogoutRequest, ResetPasswordRequest,
    UpdatePasswordRequest, UserProfileRequest, UserStatsRequest,
};
use giftdesk_shared::{
    Date, GUEST_USER, LOGGED_IN_MESSAGE, PASSWORD_UPDATED_MESSAGE, ProfileUpdate, ROLE_ADMIN,
    ROLE_EVENT_COORDINATOR, ROLE_EVENT_MANAGER, SessionUser, UserStats,
};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

// =========================================================
// 文案
// =========================================================

pub const MSG_LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid email/mobile or password.";
pub const MSG_TOO_MANY_ATTEMPTS: &str = "Too many login attempts. Please try again later.";
pub const MSG_LOGGED_OUT: &str = "Logged out successfully";
pub const MSG_NOT_AUTHENTICATED: &str = "User not authenticated";
pub const MSG_ROLE_FAILED: &str = "Failed to load user role.";
pub const MSG_PASSWORD_FAILED: &str = "Failed to change password.";
pub const MSG_PASSWORD_INCORRECT: &str = "Incorrect current password.";
pub const MSG_RESET_SENT: &str = "Password reset instructions have been sent to your email.";
pub const MSG_RESET_FAILED: &str = "Failed to send password reset instructions.";

/// 登录凭据：`usr` 可以是邮箱或手机号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub usr: String,
    pub pwd: String,
}

impl Credentials {
    pub fn new(usr: impl Into<String>, pwd: impl Into<String>) -> Self {
        Self {
            usr: usr.into(),
            pwd: pwd.into(),
        }
    }
}

/// 资料更新结果：合并后的用户记录与服务器提示
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdated {
    pub user: SessionUser,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct SessionState {
    user: Option<SessionUser>,
    role: Option<String>,
    /// RFC 3339
    last_login_time: Option<String>,
    is_loading: bool,
}

/// 会话存储
///
/// 通过 `Rc` 共享；RPC 客户端持有它的弱引用作为 401 恢复入口。
pub struct SessionStore {
    rpc: Rc<RpcClient>,
    storage: Rc<dyn KeyValueStore>,
    state: RefCell<SessionState>,
    listeners: RefCell<Vec<Rc<dyn Fn()>>>,
}

impl SessionStore {
    /// 创建存储，只恢复角色与上次登录时间
    ///
    /// 用户记录留在存储里，直到 [`SessionStore::check_auth`] 得到服务器确认。
    pub fn new(rpc: Rc<RpcClient>, storage: Rc<dyn KeyValueStore>) -> Rc<Self> {
        let store = Rc::new(Self {
            rpc,
            storage,
            state: RefCell::new(SessionState::default()),
            listeners: RefCell::new(Vec::new()),
        });
        store.rehydrate();

        let recovery: Weak<dyn AuthRecovery> = Rc::downgrade(&store) as Weak<dyn AuthRecovery>;
        store.rpc.set_recovery(recovery);
        store
    }

    fn rehydrate(&self) {
        match self.storage.get_json::<SessionUser>(KEY_USER) {
            Ok(_) => {
                let role = self.storage.get(KEY_USER_ROLE).filter(|r| !r.is_empty());
                let last_login_time = self.storage.get(KEY_LAST_LOGIN);
                let mut state = self.state.borrow_mut();
                state.role = role;
                state.last_login_time = last_login_time;
            }
            Err(e) => {
                warn!(error = %e, "stored user is corrupt, clearing auth data");
                self.clear_auth_data();
            }
        }
    }

    // --- 订阅 ---

    /// 状态变化时回调 (视图层用它驱动重新渲染)
    pub fn subscribe(&self, listener: impl Fn() + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    fn notify(&self) {
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener();
        }
    }

    fn set_loading(&self, loading: bool) {
        self.state.borrow_mut().is_loading = loading;
        self.notify();
    }

    // --- 读取 ---

    pub fn user(&self) -> Option<SessionUser> {
        self.state.borrow().user.clone()
    }

    pub fn role(&self) -> Option<String> {
        self.state.borrow().role.clone()
    }

    pub fn last_login_time(&self) -> Option<String> {
        self.state.borrow().last_login_time.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().user.is_some()
    }

    /// `first_name last_name`，未登录为空
    pub fn user_full_name(&self) -> String {
        let state = self.state.borrow();
        let Some(user) = state.user.as_ref() else {
            return String::new();
        };
        format!(
            "{} {}",
            user.first_name.as_deref().unwrap_or_default(),
            user.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }

    pub fn user_initials(&self) -> String {
        initials(self.state.borrow().user.as_ref())
    }

    // --- 角色与权限 ---

    fn role_is(&self, role: &str) -> bool {
        self.state.borrow().role.as_deref() == Some(role)
    }

    pub fn is_admin(&self) -> bool {
        self.role_is(ROLE_ADMIN)
    }

    pub fn is_event_manager(&self) -> bool {
        self.role_is(ROLE_EVENT_MANAGER)
    }

    pub fn is_event_coordinator(&self) -> bool {
        self.role_is(ROLE_EVENT_COORDINATOR)
    }

    pub fn has_role(&self) -> bool {
        self.state.borrow().role.is_some()
    }

    /// 未分配角色时放行
    fn manager_or_unassigned(&self) -> bool {
        !self.has_role() || self.is_admin() || self.is_event_manager()
    }

    pub fn can_edit_gifts(&self) -> bool {
        self.manager_or_unassigned()
    }

    pub fn can_create_gifts(&self) -> bool {
        self.manager_or_unassigned()
    }

    pub fn can_dispatch_gifts(&self) -> bool {
        self.manager_or_unassigned()
    }

    // --- 会话操作 ---

    pub async fn login(&self, credentials: Credentials) -> Result<SessionUser, String> {
        self.set_loading(true);
        let result = self.try_login(credentials).await;
        self.set_loading(false);
        result
    }

    async fn try_login(&self, credentials: Credentials) -> Result<SessionUser, String> {
        let reply = self
            .rpc
            .call_raw(&LoginRequest::new(&credentials.usr, &credentials.pwd))
            .await
            .map_err(|e| {
                warn!(error = %e, "login failed");
                self.login_error_message(&e)
            })?;

        if reply.message.as_deref() != Some(LOGGED_IN_MESSAGE) {
            warn!(message = ?reply.message, "unexpected login response");
            return Err(MSG_LOGIN_FAILED.to_string());
        }

        let full_name = reply
            .full_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| credentials.usr.clone());
        let user = SessionUser::new(credentials.usr, full_name);
        let last_login = Date::now().to_iso_string();

        {
            let mut state = self.state.borrow_mut();
            state.user = Some(user.clone());
            state.last_login_time = Some(last_login.clone());
        }
        self.persist_user(&user);
        if let Err(e) = self.storage.set(KEY_LAST_LOGIN, &last_login) {
            warn!(error = %e, "failed to persist last login");
        }
        info!(user = %user.email, "logged in");
        self.notify();

        if let Err(e) = self.load_user_role().await {
            debug!(error = %e, "role load after login failed");
        }
        Ok(user)
    }

    fn login_error_message(&self, error: &ApiError) -> String {
        if let Some(message) = error.server_message() {
            return message.to_string();
        }
        match error.status() {
            Some(401) => MSG_INVALID_CREDENTIALS.to_string(),
            Some(429) => MSG_TOO_MANY_ATTEMPTS.to_string(),
            _ if matches!(error, ApiError::Offline) || !self.rpc.is_online() => {
                crate::error::MSG_OFFLINE.to_string()
            }
            _ => MSG_LOGIN_FAILED.to_string(),
        }
    }

    /// 注销：服务器调用失败也会清空本地状态
    pub async fn logout(&self) -> String {
        self.set_loading(true);
        if self.is_authenticated() {
            if let Err(e) = self.rpc.call_raw(&LogoutRequest::default()).await {
                debug!(error = %e, "logout call failed, ignoring");
            }
        }
        self.clear_auth_data();
        self.set_loading(false);
        info!("logged out");
        MSG_LOGGED_OUT.to_string()
    }

    /// 向服务器确认持久化的会话
    ///
    /// 这是跨进程重启信任会话的唯一途径。
    pub async fn check_auth(&self) -> bool {
        let Some(stored) = self.storage.get(KEY_USER) else {
            self.clear_auth_data();
            return false;
        };

        let who = match self.rpc.call_raw(&LoggedUserRequest).await {
            Ok(who) => who,
            Err(e) => {
                warn!(error = %e, "auth check failed");
                self.clear_auth_data();
                return false;
            }
        };

        if who.is_empty() || who == GUEST_USER {
            debug!("session expired");
            self.clear_auth_data();
            return false;
        }

        let user = match serde_json::from_str::<SessionUser>(&stored) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "stored user is corrupt");
                self.clear_auth_data();
                return false;
            }
        };

        {
            let mut state = self.state.borrow_mut();
            state.user = Some(user);
            state.last_login_time = self.storage.get(KEY_LAST_LOGIN);
        }
        self.notify();

        if let Err(e) = self.load_user_role().await {
            debug!(error = %e, "role load after auth check failed");
        }
        true
    }

    /// 会话基于 cookie，没有独立的令牌刷新机制
    pub async fn refresh_auth_token(&self) -> bool {
        self.check_auth().await
    }

    pub async fn load_user_role(&self) -> Result<Option<String>, String> {
        if !self.is_authenticated() {
            return Err(MSG_NOT_AUTHENTICATED.to_string());
        }

        let info = self
            .rpc
            .call(&CurrentUserRoleRequest)
            .await
            .map_err(|e| e.server_message().unwrap_or(MSG_ROLE_FAILED).to_string())?;

        let role = info.role.filter(|r| !r.is_empty());
        let persisted = match &role {
            Some(role) => self.storage.set(KEY_USER_ROLE, role),
            None => {
                self.storage.remove(KEY_USER_ROLE);
                Ok(())
            }
        };
        if let Err(e) = persisted {
            warn!(error = %e, "failed to persist role");
        }
        self.state.borrow_mut().role = role.clone();
        self.notify();
        Ok(role)
    }

    /// 清空内存状态与全部认证键
    pub fn clear_auth_data(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.user = None;
            state.role = None;
            state.last_login_time = None;
        }
        for key in AUTH_KEYS {
            self.storage.remove(key);
        }
        self.notify();
    }

    // --- 资料与密码 ---

    pub async fn update_profile(&self, data: ProfileUpdate) -> Result<ProfileUpdated, String> {
        self.set_loading(true);
        let result = match self.rpc.call(&data).await {
            Ok(reply) => self
                .merge_profile(&reply.user)
                .map(|user| ProfileUpdated {
                    user,
                    message: reply.message,
                }),
            Err(e) => Err(e.user_message("Failed to update user profile")),
        };
        self.set_loading(false);
        result
    }

    pub async fn load_user_profile(&self) -> Result<SessionUser, String> {
        let reply = self
            .rpc
            .call(&UserProfileRequest)
            .await
            .map_err(|e| e.user_message("Failed to fetch user profile"))?;
        self.merge_profile(&reply.user)
    }

    fn merge_profile(&self, profile: &giftdesk_shared::UserProfile) -> Result<SessionUser, String> {
        let merged = {
            let mut state = self.state.borrow_mut();
            let Some(user) = state.user.as_mut() else {
                return Err(MSG_NOT_AUTHENTICATED.to_string());
            };
            user.merge(profile);
            user.clone()
        };
        self.persist_user(&merged);
        self.notify();
        Ok(merged)
    }

    pub async fn get_user_stats(&self) -> Result<UserStats, String> {
        self.rpc
            .call(&UserStatsRequest)
            .await
            .map_err(|e| e.user_message("Failed to fetch user statistics"))
    }

    pub async fn change_password(&self, current: &str, new: &str) -> Result<(), String> {
        self.set_loading(true);
        let request = UpdatePasswordRequest {
            old_password: current.to_string(),
            new_password: new.to_string(),
        };
        let result = match self.rpc.call(&request).await {
            Ok(reply) if reply.as_str() == Some(PASSWORD_UPDATED_MESSAGE) => Ok(()),
            Ok(reply) => {
                warn!(?reply, "unexpected password change response");
                Err(MSG_PASSWORD_FAILED.to_string())
            }
            Err(e) => Err(match e.server_message() {
                Some(message) => message.to_string(),
                None if e.has_exception() => MSG_PASSWORD_INCORRECT.to_string(),
                None => MSG_PASSWORD_FAILED.to_string(),
            }),
        };
        self.set_loading(false);
        result
    }

    pub async fn forgot_password(&self, email: &str) -> Result<String, String> {
        self.set_loading(true);
        let request = ResetPasswordRequest {
            user: email.to_string(),
        };
        let result = match self.rpc.call(&request).await {
            Ok(_) => Ok(MSG_RESET_SENT.to_string()),
            Err(e) => Err(e.server_message().unwrap_or(MSG_RESET_FAILED).to_string()),
        };
        self.set_loading(false);
        result
    }

    fn persist_user(&self, user: &SessionUser) {
        if let Err(e) = self.storage.set_json(KEY_USER, user) {
            warn!(error = %e, "failed to persist user");
        }
    }
}

#[async_trait::async_trait(?Send)]
impl AuthRecovery for SessionStore {
    async fn refresh_auth_token(&self) -> bool {
        SessionStore::refresh_auth_token(self).await
    }

    fn clear_auth_data(&self) {
        SessionStore::clear_auth_data(self)
    }
}

/// 头像缩写
///
/// 取全名 (或邮箱) 的第一个词，邮箱只取 `@` 前的部分；
/// 取前两个字符大写，只有一个字符时补 `U`，未登录为 `GU`。
pub fn initials(user: Option<&SessionUser>) -> String {
    let Some(user) = user else {
        return "GU".to_string();
    };
    let name = [user.full_name.as_str(), user.email.as_str()]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or("Guest User");
    let first_word = name.split_whitespace().next().unwrap_or_default();
    let clean = match first_word.split_once('@') {
        Some((local, _)) => local,
        None => first_word,
    };

    let chars: Vec<char> = clean.chars().collect();
    if chars.len() >= 2 {
        chars[..2].iter().collect::<String>().to_uppercase()
    } else {
        let first = chars.first().map(|c| c.to_string()).unwrap_or_default();
        format!("{}U", first).to_uppercase()
    }
}
