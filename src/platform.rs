use std::time::Duration;

use js_sys::Promise;
use leptos::prelude::window;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, ScrollBehavior, ScrollToOptions};

use crate::enhance::{Clipboard, CopyLabel, COPIED_CLASS};
use crate::error::ClipboardError;
use crate::fetch::describe_js_error;

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserClipboard;

impl Clipboard for BrowserClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let promise = window().navigator().clipboard().write_text(text);
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|err| ClipboardError(describe_js_error(&err)))
    }
}

/// Resolves after `duration` on the page's timer queue.
pub async fn sleep(duration: Duration) {
    let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
    let timer = Promise::new(&mut |resolve, _reject| {
        if let Err(err) =
            window().set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
        {
            leptos::logging::warn!("could not schedule timer: {}", describe_js_error(&err));
            let _ = resolve.call0(&wasm_bindgen::JsValue::UNDEFINED);
        }
    });
    let _ = JsFuture::from(timer).await;
}

pub fn scroll_to_top() {
    let options = ScrollToOptions::new();
    options.set_top(0.0);
    options.set_behavior(ScrollBehavior::Smooth);
    window().scroll_to_with_scroll_to_options(&options);
}

pub fn show_copy_label(button: &Element, label: CopyLabel) {
    button.set_text_content(Some(label.text()));
    let classes = button.class_list();
    let toggled = if label.is_copied() {
        classes.add_1(COPIED_CLASS)
    } else {
        classes.remove_1(COPIED_CLASS)
    };
    if let Err(err) = toggled {
        leptos::logging::warn!("could not update copy button: {}", describe_js_error(&err));
    }
}
