//! 认证模块
//!
//! 把核心库的 [`SessionStore`] 桥接到 Leptos 信号。
//! 路由服务通过注入的认证信号感知登录状态。

use giftdesk::session::{Credentials, SessionStore};
use giftdesk_shared::SessionUser;
use leptos::prelude::*;
use std::rc::Rc;

/// 会话快照 (供视图读取)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<SessionUser>,
    pub role: Option<String>,
    pub full_name: String,
    pub initials: String,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl AuthState {
    fn snapshot(session: &SessionStore) -> Self {
        Self {
            user: session.user(),
            role: session.role(),
            full_name: session.user_full_name(),
            initials: session.user_initials(),
            is_authenticated: session.is_authenticated(),
            is_loading: session.is_loading(),
        }
    }
}

/// 认证上下文
///
/// 状态信号 + 会话存储句柄，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub state: ReadSignal<AuthState>,
    session: StoredValue<Rc<SessionStore>, LocalStorage>,
}

impl AuthContext {
    /// 创建上下文并订阅会话变化
    pub fn new(session: Rc<SessionStore>) -> Self {
        let (state, set_state) = signal(AuthState::snapshot(&session));

        // 监听器由会话存储持有，只捕获弱引用避免循环
        let weak = Rc::downgrade(&session);
        session.subscribe(move || {
            if let Some(session) = weak.upgrade() {
                set_state.set(AuthState::snapshot(&session));
            }
        });

        Self {
            state,
            session: StoredValue::new_local(session),
        }
    }

    pub fn session(&self) -> Rc<SessionStore> {
        self.session.get_value()
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.get().is_authenticated)
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 登录 (同时加载角色)；成功后路由服务会根据认证信号自动离开登录页
pub async fn login(ctx: &AuthContext, email: String, password: String) -> Result<SessionUser, String> {
    ctx.session().login(Credentials::new(email, password)).await
}

/// 注销并清除状态，返回提示文案
///
/// 导航由路由服务的认证状态监听自动处理。
pub async fn logout(ctx: &AuthContext) -> String {
    ctx.session().logout().await
}
