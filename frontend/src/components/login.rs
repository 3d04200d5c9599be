use crate::app_state::use_app;
use crate::auth::{login, use_auth};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let app = use_app();
    let app_name = app.services().config.app_name.clone();

    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    // 会话恢复期间显示加载状态
    let is_loading = move || auth.state.get().is_loading && !is_submitting.get();

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let (usr, pwd) = (email.get_untracked(), password.get_untracked());
        if usr.trim().is_empty() || pwd.is_empty() {
            set_error_msg.set(Some("Please fill in all fields".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        spawn_local(async move {
            // 成功后由路由服务监听认证状态跳转
            if let Err(message) = login(&auth, usr.trim().to_string(), pwd).await {
                set_error_msg.set(Some(message));
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <Show
            when=move || !is_loading()
            fallback=|| view! { <div class="flex items-center justify-center min-h-screen"><span class="loading loading-spinner loading-lg text-primary"></span></div> }
        >
            <div class="hero min-h-screen bg-base-200">
                <div class="hero-content flex-col w-full max-w-md">
                    <div class="text-center mb-4">
                        <h1 class="text-3xl font-bold">{app_name.clone()}</h1>
                        <p class="text-base-content/70">"Sign in to continue"</p>
                    </div>

                    <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                        <form class="card-body" on:submit=on_submit>
                            {move || error_msg.get().map(|msg| view! {
                                <div role="alert" class="alert alert-error text-sm py-2">
                                    <span>{msg}</span>
                                </div>
                            })}

                            <div class="form-control">
                                <label class="label" for="email">
                                    <span class="label-text">"Email or mobile"</span>
                                </label>
                                <input
                                    id="email"
                                    type="text"
                                    autocomplete="username"
                                    on:input=move |ev| set_email.set(event_target_value(&ev))
                                    prop:value=email
                                    class="input input-bordered"
                                    required
                                />
                            </div>
                            <div class="form-control">
                                <label class="label" for="password">
                                    <span class="label-text">"Password"</span>
                                </label>
                                <input
                                    id="password"
                                    type="password"
                                    autocomplete="current-password"
                                    on:input=move |ev| set_password.set(event_target_value(&ev))
                                    prop:value=password
                                    class="input input-bordered"
                                    required
                                />
                            </div>
                            <div class="form-control mt-6">
                                <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                    {move || if is_submitting.get() {
                                        view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                                    } else {
                                        "Sign in".into_any()
                                    }}
                                </button>
                            </div>
                        </form>
                    </div>
                </div>
            </div>
        </Show>
    }
}
