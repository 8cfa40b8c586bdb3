use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use regex::{Captures, Regex};

use crate::error::ClipboardError;

pub const CODE_CONTAINER_CLASS: &str = "code-container";
pub const COPY_BUTTON_CLASS: &str = "copy-button";
pub const COPIED_CLASS: &str = "copied";
pub const BACK_TO_TOP_CONTAINER_CLASS: &str = "back-to-top-container";
pub const BACK_TO_TOP_CLASS: &str = "back-to-top";
pub const BACK_TO_TOP_LABEL: &str = "⬆️ Voltar ao Topo";

/// How long a copy button shows its result before reverting.
pub const COPY_FEEDBACK: Duration = Duration::from_millis(2000);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyBinding {
    pub index: usize,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnhancedHtml {
    pub html: String,
    pub bindings: Vec<CopyBinding>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CopyLabel {
    #[default]
    Idle,
    Copied,
    Failed,
}

impl CopyLabel {
    pub fn text(self) -> &'static str {
        match self {
            Self::Idle => "📋 Copiar",
            Self::Copied => "✅ Copiado!",
            Self::Failed => "❌ Erro",
        }
    }

    pub fn is_copied(self) -> bool {
        self == Self::Copied
    }
}

pub trait Clipboard {
    fn write_text(&self, text: &str) -> impl Future<Output = Result<(), ClipboardError>>;
}

/// Writes the binding's payload and reports the label to show for
/// [`COPY_FEEDBACK`]. Rejections are logged, never propagated.
pub async fn copy_block<C: Clipboard>(clipboard: &C, binding: &CopyBinding) -> CopyLabel {
    match clipboard.write_text(&binding.text).await {
        Ok(()) => CopyLabel::Copied,
        Err(err) => {
            leptos::logging::error!("copy of code block {} failed: {err}", binding.index);
            CopyLabel::Failed
        }
    }
}

/// Runs a copy from the button's point of view: shows the result label,
/// waits [`COPY_FEEDBACK`] on `sleep`, then restores the idle label.
pub async fn copy_with_feedback<C, S, Fut>(
    clipboard: &C,
    binding: &CopyBinding,
    sleep: S,
    mut show: impl FnMut(CopyLabel),
) -> CopyLabel
where
    C: Clipboard,
    S: FnOnce(Duration) -> Fut,
    Fut: Future<Output = ()>,
{
    let label = copy_block(clipboard, binding).await;
    show(label);
    sleep(COPY_FEEDBACK).await;
    show(CopyLabel::Idle);
    label
}

/// Wraps every `<pre><code>` block in a container with a copy button and
/// collects the text content of each block, indexed in document order.
pub fn enhance_code_blocks(html: &str) -> EnhancedHtml {
    static RE_BLOCK: OnceLock<Regex> = OnceLock::new();
    let re_block = RE_BLOCK
        .get_or_init(|| Regex::new(r"(?s)<pre([^>]*)>\s*<code([^>]*)>(.*?)</code>\s*</pre>").unwrap());

    let mut bindings = Vec::new();
    let enhanced = re_block.replace_all(html, |caps: &Captures| {
        let index = bindings.len();
        let pre_attrs = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let code_attrs = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let body = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
        bindings.push(CopyBinding {
            index,
            text: block_text(body),
        });
        format!(
            "<div class=\"{CODE_CONTAINER_CLASS}\"><button class=\"{COPY_BUTTON_CLASS}\" data-index=\"{index}\" type=\"button\">{}</button><pre{pre_attrs}><code{code_attrs}>{body}</code></pre></div>",
            CopyLabel::Idle.text()
        )
    });

    EnhancedHtml {
        html: enhanced.into_owned(),
        bindings,
    }
}

/// Drops any back-to-top control already present and appends a single new one.
pub fn attach_back_to_top(html: &str) -> String {
    static RE_EXISTING: OnceLock<Regex> = OnceLock::new();
    let re_existing = RE_EXISTING.get_or_init(|| {
        Regex::new(&format!(
            r#"(?s)<div class="{BACK_TO_TOP_CONTAINER_CLASS}">.*?</div>"#
        ))
        .unwrap()
    });

    let mut out = re_existing.replace_all(html, "").into_owned();
    out.push_str(&format!(
        "<div class=\"{BACK_TO_TOP_CONTAINER_CLASS}\"><button class=\"{BACK_TO_TOP_CLASS}\" type=\"button\">{BACK_TO_TOP_LABEL}</button></div>"
    ));
    out
}

/// Text content of a block's inner HTML: tags dropped, character
/// references resolved in a single pass so `&amp;lt;` stays `&lt;`.
fn block_text(inner_html: &str) -> String {
    static RE_TAG: OnceLock<Regex> = OnceLock::new();
    static RE_ENTITY: OnceLock<Regex> = OnceLock::new();

    let re_tag = RE_TAG.get_or_init(|| Regex::new(r"<[^>]*>").unwrap());
    let re_entity = RE_ENTITY
        .get_or_init(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

    let text = re_tag.replace_all(inner_html, "");
    re_entity
        .replace_all(&text, |caps: &Captures| {
            let name = &caps[1];
            let decoded = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => {
                    let code = match name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => name.strip_prefix('#').and_then(|dec| dec.parse().ok()),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::render::{CmarkRenderer, MarkdownRenderer};

    #[derive(Default)]
    struct RecordingClipboard {
        reject: bool,
        written: RefCell<Vec<String>>,
    }

    impl Clipboard for RecordingClipboard {
        async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            if self.reject {
                return Err(ClipboardError("permission denied".to_string()));
            }
            self.written.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn wraps_each_block_with_indexed_button() {
        let html = "<p>intro <code>inline</code></p>\n<pre><code class=\"language-rust\">let a = &quot;x&quot; &lt; 3;\n</code></pre>\n<pre><code>echo &amp;&amp; exit\n</code></pre>\n";
        let enhanced = enhance_code_blocks(html);

        assert_eq!(enhanced.bindings.len(), 2);
        assert_eq!(count(&enhanced.html, "class=\"copy-button\""), 2);
        assert_eq!(count(&enhanced.html, "class=\"code-container\""), 2);
        assert!(enhanced.html.contains("data-index=\"0\""));
        assert!(enhanced.html.contains("data-index=\"1\""));
        assert!(enhanced.html.contains("<p>intro <code>inline</code></p>"));
        assert!(enhanced
            .html
            .contains("<pre><code class=\"language-rust\">let a = &quot;x&quot; &lt; 3;\n</code></pre></div>"));

        assert_eq!(enhanced.bindings[0].text, "let a = \"x\" < 3;\n");
        assert_eq!(enhanced.bindings[1].text, "echo && exit\n");
    }

    #[test]
    fn payload_is_text_content_of_raw_html_blocks() {
        let enhanced = enhance_code_blocks("<pre><code>a <b>bold</b> &#123; x</code></pre>");
        assert_eq!(enhanced.bindings[0].text, "a bold { x");
        assert!(enhanced.html.contains("<code>a <b>bold</b> &#123; x</code>"));
    }

    #[test]
    fn block_text_resolves_references_once() {
        assert_eq!(block_text("&amp;lt; &#x41;&#66; &nbsp;&copy;"), "&lt; AB \u{a0}&copy;");
        assert_eq!(block_text("<span class=\"k\">let</span> x = 1;"), "let x = 1;");
    }

    #[test]
    fn leaves_html_without_blocks_untouched() {
        let html = "<h1 id=\"a\">A</h1><p>text</p>";
        let enhanced = enhance_code_blocks(html);
        assert_eq!(enhanced.html, html);
        assert!(enhanced.bindings.is_empty());
    }

    #[test]
    fn bindings_follow_rendered_markdown() {
        let markdown = "# Shell\n\n```sh\ncargo run --release\n```\n\ntext\n\n```\na < b && c\n```\n";
        let enhanced = enhance_code_blocks(&CmarkRenderer.render(markdown));
        let texts: Vec<_> = enhanced.bindings.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, ["cargo run --release\n", "a < b && c\n"]);
        assert_eq!(count(&enhanced.html, COPY_BUTTON_CLASS), texts.len());
    }

    #[test]
    fn back_to_top_is_never_duplicated() {
        let once = attach_back_to_top("<p>body</p>");
        let twice = attach_back_to_top(&once);
        assert_eq!(count(&twice, BACK_TO_TOP_CONTAINER_CLASS), 1);
        assert!(twice.starts_with("<p>body</p>"));
        assert!(twice.ends_with("</button></div>"));
        assert!(twice.contains(BACK_TO_TOP_LABEL));
    }

    #[test]
    fn copy_labels() {
        assert_eq!(CopyLabel::default().text(), "📋 Copiar");
        assert!(CopyLabel::Copied.is_copied());
        assert!(!CopyLabel::Failed.is_copied());
        assert_eq!(COPY_FEEDBACK.as_millis(), 2000);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn copy_writes_exact_block_text() {
        let clipboard = RecordingClipboard::default();
        let binding = CopyBinding {
            index: 0,
            text: "fn main() {}\n".to_string(),
        };
        assert_eq!(copy_block(&clipboard, &binding).await, CopyLabel::Copied);
        assert_eq!(clipboard.written.borrow().as_slice(), ["fn main() {}\n"]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn rejected_copy_reports_failure_without_panicking() {
        let clipboard = RecordingClipboard {
            reject: true,
            ..Default::default()
        };
        let binding = CopyBinding {
            index: 3,
            text: "ls".to_string(),
        };
        assert_eq!(copy_block(&clipboard, &binding).await, CopyLabel::Failed);
        assert!(clipboard.written.borrow().is_empty());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn copied_label_reverts_after_feedback_window() {
        let clipboard = RecordingClipboard::default();
        let binding = CopyBinding {
            index: 0,
            text: "cargo build".to_string(),
        };
        let shown = RefCell::new(Vec::new());
        let start = tokio::time::Instant::now();

        let label = copy_with_feedback(&clipboard, &binding, tokio::time::sleep, |label| {
            shown.borrow_mut().push((label, start.elapsed()));
        })
        .await;

        assert_eq!(label, CopyLabel::Copied);
        assert_eq!(
            shown.into_inner(),
            [
                (CopyLabel::Copied, Duration::ZERO),
                (CopyLabel::Idle, COPY_FEEDBACK)
            ]
        );
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn failed_label_reverts_after_feedback_window() {
        let clipboard = RecordingClipboard {
            reject: true,
            ..Default::default()
        };
        let binding = CopyBinding {
            index: 1,
            text: "ls".to_string(),
        };
        let shown = RefCell::new(Vec::new());
        let start = tokio::time::Instant::now();

        let label = copy_with_feedback(&clipboard, &binding, tokio::time::sleep, |label| {
            shown.borrow_mut().push((label, start.elapsed()));
        })
        .await;

        assert_eq!(label, CopyLabel::Failed);
        assert_eq!(
            shown.into_inner(),
            [
                (CopyLabel::Failed, Duration::ZERO),
                (CopyLabel::Idle, COPY_FEEDBACK)
            ]
        );
    }
}
