//! 扫码页：初始化提示音与振动反馈

use crate::app_state::use_app;
use crate::web::feedback::{BlobAudioSink, NavigatorVibrator};
use giftdesk::composables::{Haptics, ScannerAudio};
use leptos::prelude::*;
use std::rc::Rc;

#[component]
pub fn ScannerPage() -> impl IntoView {
    let app = use_app();

    let audio = ScannerAudio::new(Rc::new(BlobAudioSink::default()));
    let ready = audio.initialize();
    let haptics = Haptics::new(Rc::new(NavigatorVibrator));
    let haptics_available = haptics.is_available();

    let audio = StoredValue::new_local(audio);
    let haptics = StoredValue::new_local(haptics);

    let (sound_on, set_sound_on) = signal(true);
    let (vibration_on, set_vibration_on) = signal(true);

    let on_test = move |_| {
        audio.with_value(|a| a.play_success());
        haptics.with_value(|h| h.test());
    };
    let on_fail = move |_| {
        audio.with_value(|a| a.play_error());
        haptics.with_value(|h| h.error());
    };

    let toggle_sound = move |_| {
        let enabled = !sound_on.get_untracked();
        audio.with_value(|a| a.set_enabled(enabled));
        set_sound_on.set(enabled);
    };
    let toggle_vibration = move |_| {
        let enabled = !vibration_on.get_untracked();
        haptics.with_value(|h| h.set_enabled(enabled));
        set_vibration_on.set(enabled);
    };

    if !ready {
        app.error("Scanner audio is unavailable on this device");
    }

    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body space-y-4">
                <h2 class="card-title">"Scan Gift"</h2>
                <div class="flex gap-2 flex-wrap">
                    <button class="btn btn-success" on:click=on_test>"Test feedback"</button>
                    <button class="btn btn-error btn-outline" on:click=on_fail>"Test error"</button>
                </div>
                <label class="label cursor-pointer">
                    <span class="label-text">"Sound"</span>
                    <input type="checkbox" class="toggle" prop:checked=sound_on on:change=toggle_sound />
                </label>
                <Show when=move || haptics_available>
                    <label class="label cursor-pointer">
                        <span class="label-text">"Vibration"</span>
                        <input type="checkbox" class="toggle" prop:checked=vibration_on on:change=toggle_vibration />
                    </label>
                </Show>
            </div>
        </div>
    }
}
