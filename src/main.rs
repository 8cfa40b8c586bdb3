mod app;
mod enhance;
mod error;
mod fetch;
mod lesson;
mod platform;
mod render;
mod viewer;

use app::*;
use leptos::prelude::*;
use lesson::LessonCatalog;

/// Inline JSON element in `index.html` that may override the standard lessons.
const CATALOG_ELEMENT_ID: &str = "lesson-catalog";

fn load_catalog() -> LessonCatalog {
    let raw = document()
        .get_element_by_id(CATALOG_ELEMENT_ID)
        .and_then(|element| element.text_content());
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return LessonCatalog::default();
    };
    LessonCatalog::from_json(&raw).unwrap_or_else(|err| {
        leptos::logging::warn!("ignoring #{CATALOG_ELEMENT_ID}: {err}");
        LessonCatalog::default()
    })
}

fn main() {
    console_error_panic_hook::set_once();
    let catalog = load_catalog();
    mount_to_body(move || {
        view! { <App catalog=catalog /> }
    })
}
