use crate::enhance::{attach_back_to_top, enhance_code_blocks, CopyBinding};
use crate::error::LoadError;
use crate::lesson::{LessonCatalog, LessonId, LessonRef, NavGesture};
use crate::render::MarkdownRenderer;

pub const LOADING_HTML: &str = r#"<div class="loading">⏳ Carregando conteúdo...</div>"#;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedLesson {
    pub html: String,
    pub copy_bindings: Vec<CopyBinding>,
}

/// What the content region shows. Always replaced wholesale.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Display {
    #[default]
    Empty,
    Loading,
    Ready(RenderedLesson),
    Failed {
        html: String,
    },
}

impl Display {
    pub fn html(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::Loading => LOADING_HTML,
            Self::Ready(rendered) => &rendered.html,
            Self::Failed { html, .. } => html,
        }
    }
}

/// A load in flight. Only the ticket carrying the latest token may apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    pub token: u64,
    pub lesson: LessonRef,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered,
    Fallback,
    Stale,
}

impl LoadOutcome {
    pub fn applied(self) -> bool {
        !matches!(self, Self::Stale)
    }
}

/// Single source of truth for the page: the active lesson, the content
/// region and the newest request token. Highlighting and progress are
/// derived from it, never read back from markup.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewer {
    catalog: LessonCatalog,
    active: Option<LessonId>,
    display: Display,
    issued: u64,
}

impl Viewer {
    pub fn new(catalog: LessonCatalog) -> Self {
        Self {
            catalog,
            active: None,
            display: Display::Empty,
            issued: 0,
        }
    }

    pub fn catalog(&self) -> &LessonCatalog {
        &self.catalog
    }

    pub fn active(&self) -> Option<LessonId> {
        self.active
    }

    pub fn is_active(&self, id: LessonId) -> bool {
        self.active() == Some(id)
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn progress_percent(&self) -> f64 {
        self.active
            .map(|id| self.catalog.progress_percent(id))
            .unwrap_or_default()
    }

    pub fn copy_binding(&self, index: usize) -> Option<&CopyBinding> {
        match &self.display {
            Display::Ready(rendered) => rendered.copy_bindings.get(index),
            _ => None,
        }
    }

    pub fn neighbor(&self, gesture: NavGesture) -> Option<LessonId> {
        self.catalog.neighbor(self.active()?, gesture)
    }

    /// Shows the loading indicator and issues a fresh token for `id`.
    pub fn begin_load(&mut self, id: LessonId) -> Option<LoadTicket> {
        let lesson = self.catalog.get(id)?.clone();
        self.issued += 1;
        self.display = Display::Loading;
        Some(LoadTicket {
            token: self.issued,
            lesson,
        })
    }

    /// Applies a settled fetch: render, enhance, attach back-to-top, then
    /// move the active marker. Responses for superseded tickets are dropped.
    pub fn finish_load<R: MarkdownRenderer>(
        &mut self,
        ticket: LoadTicket,
        result: Result<String, LoadError>,
        renderer: &R,
    ) -> LoadOutcome {
        if ticket.token != self.issued {
            leptos::logging::log!(
                "dropping stale response for {} (token {} < {})",
                ticket.lesson.path,
                ticket.token,
                self.issued
            );
            return LoadOutcome::Stale;
        }

        let id = ticket.lesson.id;
        let outcome = match result {
            Ok(markdown) => {
                let enhanced = enhance_code_blocks(&renderer.render(&markdown));
                self.display = Display::Ready(RenderedLesson {
                    html: attach_back_to_top(&enhanced.html),
                    copy_bindings: enhanced.bindings,
                });
                LoadOutcome::Rendered
            }
            Err(_) => {
                self.display = Display::Failed {
                    html: fallback_html(&ticket.lesson.path),
                };
                LoadOutcome::Fallback
            }
        };
        self.active = Some(id);
        outcome
    }
}

fn fallback_html(path: &str) -> String {
    let path = path
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
    format!(
        "<div class=\"error\"><h2>❌ Erro ao carregar conteúdo</h2><p>Não foi possível carregar o arquivo: <strong>{path}</strong></p><p>Verifique se o arquivo existe no diretório correto.</p></div>"
    )
}
