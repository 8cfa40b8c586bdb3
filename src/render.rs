use std::collections::HashMap;
use std::sync::OnceLock;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

/// Markdown in, HTML out. Implementations must be deterministic.
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> String;
}

/// pulldown-cmark with GitHub-flavored extensions, hard line breaks and
/// slugged heading ids, sanitized through ammonia.
#[derive(Clone, Copy, Debug, Default)]
pub struct CmarkRenderer;

impl CmarkRenderer {
    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_GFM);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        options
    }
}

impl MarkdownRenderer for CmarkRenderer {
    fn render(&self, markdown: &str) -> String {
        let events = Parser::new_ext(markdown, Self::options())
            .map(|event| match event {
                Event::SoftBreak => Event::HardBreak,
                other => other,
            })
            .collect::<Vec<_>>();

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, assign_heading_ids(events).into_iter());
        sanitize_html(&out)
    }
}

fn assign_heading_ids<'a>(events: Vec<Event<'a>>) -> Vec<Event<'a>> {
    let mut slugger = HeadingSlugger::default();
    let mut ids = HashMap::new();
    let mut open: Option<(usize, String)> = None;

    // Explicit ids win over generated slugs wherever they appear.
    for event in &events {
        if let Event::Start(Tag::Heading { id: Some(id), .. }) = event {
            slugger.reserve(id);
        }
    }

    for (idx, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading { id: None, .. }) => open = Some((idx, String::new())),
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = open.as_mut() {
                    buf.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((start, text)) = open.take() {
                    ids.insert(start, slugger.slug(&text));
                }
            }
            _ => {}
        }
    }

    events
        .into_iter()
        .enumerate()
        .map(|(idx, event)| match (ids.remove(&idx), event) {
            (
                Some(slug),
                Event::Start(Tag::Heading {
                    level,
                    classes,
                    attrs,
                    ..
                }),
            ) => Event::Start(Tag::Heading {
                level,
                id: Some(CowStr::from(slug)),
                classes,
                attrs,
            }),
            (_, event) => event,
        })
        .collect()
}

#[derive(Debug, Default)]
struct HeadingSlugger {
    seen: HashMap<String, usize>,
}

impl HeadingSlugger {
    fn reserve(&mut self, id: &str) {
        self.seen.entry(id.to_string()).or_insert(0);
    }

    fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let slug = match self.seen.get(&base).copied() {
            None => base,
            Some(mut count) => loop {
                count += 1;
                let candidate = format!("{base}-{count}");
                if !self.seen.contains_key(&candidate) {
                    self.seen.insert(base, count);
                    break candidate;
                }
            },
        };
        self.seen.insert(slug.clone(), 0);
        slug
    }
}

fn slugify(text: &str) -> String {
    static RE_PUNCT: OnceLock<Regex> = OnceLock::new();
    static RE_SPACE: OnceLock<Regex> = OnceLock::new();

    let re_punct = RE_PUNCT.get_or_init(|| {
        Regex::new(r##"[\x{2000}-\x{206F}\x{2E00}-\x{2E7F}\\'!"#$%&()*+,./:;<=>?@\[\]^`{|}~]"##)
            .unwrap()
    });
    let re_space = RE_SPACE.get_or_init(|| Regex::new(r"\s").unwrap());

    let lowered = text.trim().to_lowercase();
    let stripped = re_punct.replace_all(&lowered, "");
    let slug = re_space.replace_all(&stripped, "-").into_owned();
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

fn sanitize_html(html: &str) -> String {
    ammonia::Builder::default()
        .add_tags(["input"])
        .add_generic_attributes(["id"])
        .add_tag_attributes("code", ["class"])
        .add_tag_attributes("input", ["type", "checked", "disabled"])
        .clean(html)
        .to_string()
}
