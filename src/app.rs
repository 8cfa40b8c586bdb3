use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::enhance::{copy_with_feedback, BACK_TO_TOP_CLASS, COPY_BUTTON_CLASS};
use crate::fetch::{ContentFetcher, HttpFetcher};
use crate::lesson::{LessonCatalog, LessonId, NavGesture};
use crate::platform::{scroll_to_top, show_copy_label, sleep, BrowserClipboard};
use crate::render::CmarkRenderer;
use crate::viewer::Viewer;

fn closest(target: &leptos::web_sys::Element, class: &str) -> Option<leptos::web_sys::Element> {
    target.closest(&format!(".{class}")).ok().flatten()
}

#[component]
pub fn App(catalog: LessonCatalog) -> impl IntoView {
    let viewer = RwSignal::new(Viewer::new(catalog));
    let (lessons, first) =
        viewer.with_untracked(|v| (v.catalog().lessons().to_vec(), v.catalog().first().id));
    let renderer = CmarkRenderer;

    let open_lesson = move |id: LessonId| {
        let mut ticket = None;
        viewer.maybe_update(|v| {
            ticket = v.begin_load(id);
            ticket.is_some()
        });
        let Some(ticket) = ticket else {
            leptos::logging::warn!("no lesson registered under id {id}");
            return;
        };

        spawn_local(async move {
            let result = HttpFetcher.fetch_text(&ticket.lesson.path).await;
            if let Err(err) = &result {
                leptos::logging::error!("showing fallback for {}: {err}", err.path());
            }
            let mut applied = false;
            viewer.maybe_update(|v| {
                applied = v.finish_load(ticket, result, &renderer).applied();
                applied
            });
            if applied {
                scroll_to_top();
            }
        });
    };

    Effect::new(move |_| open_lesson(first));

    let keydown = window_event_listener(ev::keydown, move |e| {
        let Some(gesture) = NavGesture::from_key(&e.key()) else {
            return;
        };
        if let Some(next) = viewer.with_untracked(|v| v.neighbor(gesture)) {
            open_lesson(next);
        }
    });
    on_cleanup(move || keydown.remove());

    let on_content_click = move |e: ev::MouseEvent| {
        let target: leptos::web_sys::Element = event_target(&e);
        if closest(&target, BACK_TO_TOP_CLASS).is_some() {
            scroll_to_top();
            return;
        }
        let Some(button) = closest(&target, COPY_BUTTON_CLASS) else {
            return;
        };
        let binding = button
            .get_attribute("data-index")
            .and_then(|raw| raw.parse::<usize>().ok())
            .and_then(|index| viewer.with_untracked(|v| v.copy_binding(index).cloned()));
        let Some(binding) = binding else {
            return;
        };

        spawn_local(async move {
            copy_with_feedback(&BrowserClipboard, &binding, sleep, |label| {
                show_copy_label(&button, label)
            })
            .await;
        });
    };

    view! {
        <div class="viewer">
            <div class="progress">
                <div
                    id="progressBar"
                    class="progress-bar"
                    style:width=move || format!("{}%", viewer.with(|v| v.progress_percent()))
                ></div>
            </div>
            <nav class="lesson-nav">
                {lessons.into_iter().map(|lesson| {
                    let id = lesson.id;
                    view! {
                        <button
                            class="lesson-btn"
                            class:active=move || viewer.with(|v| v.is_active(id))
                            data-lesson=id.to_string()
                            data-file=lesson.path
                            on:click=move |_| open_lesson(id)
                        >
                            {lesson.title}
                        </button>
                    }
                }).collect_view()}
            </nav>
            <main
                id="lessonContent"
                class="lesson-content"
                inner_html=move || viewer.with(|v| v.display().html().to_string())
                on:click=on_content_click
            ></main>
        </div>
    }
}
