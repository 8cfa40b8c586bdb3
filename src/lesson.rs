use std::fmt;

use serde::Deserialize;

use crate::error::CatalogError;

pub const STANDARD_LESSON_COUNT: u32 = 11;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct LessonId(u32);

impl LessonId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LessonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LessonRef {
    pub id: LessonId,
    pub path: String,
    #[serde(default)]
    pub title: String,
}

impl LessonRef {
    pub fn new(id: LessonId, path: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
            title: default_title(id),
        }
    }
}

fn default_title(id: LessonId) -> String {
    format!("Aula {id}")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavGesture {
    Next,
    Previous,
}

impl NavGesture {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" | "n" => Some(Self::Next),
            "ArrowLeft" | "p" => Some(Self::Previous),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    lessons: Vec<LessonRef>,
}

/// Ordered lessons with contiguous ids starting at 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonCatalog {
    lessons: Vec<LessonRef>,
}

impl Default for LessonCatalog {
    fn default() -> Self {
        Self::standard(STANDARD_LESSON_COUNT)
    }
}

impl LessonCatalog {
    /// Lessons served from `./aulas/aula{n}.md`.
    pub fn standard(count: u32) -> Self {
        let lessons = (1..=count.max(1))
            .map(|n| LessonRef::new(LessonId::new(n), format!("./aulas/aula{n}.md")))
            .collect();
        Self { lessons }
    }

    pub fn new(mut lessons: Vec<LessonRef>) -> Result<Self, CatalogError> {
        if lessons.is_empty() {
            return Err(CatalogError::Empty);
        }
        lessons.sort_by_key(|lesson| lesson.id);
        for (expected, lesson) in (1u32..).zip(&mut lessons) {
            if lesson.id.get() != expected {
                return Err(CatalogError::Gap {
                    expected,
                    found: lesson.id.get(),
                });
            }
            if lesson.title.trim().is_empty() {
                lesson.title = default_title(lesson.id);
            }
        }
        Ok(Self { lessons })
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        Self::new(file.lessons)
    }

    pub fn lessons(&self) -> &[LessonRef] {
        &self.lessons
    }

    pub fn first(&self) -> &LessonRef {
        &self.lessons[0]
    }

    pub fn get(&self, id: LessonId) -> Option<&LessonRef> {
        let index = usize::try_from(id.get()).ok()?.checked_sub(1)?;
        self.lessons.get(index)
    }

    pub fn progress_percent(&self, id: LessonId) -> f64 {
        f64::from(id.get()) / self.lessons.len() as f64 * 100.0
    }

    /// Lesson reached from `from` by `gesture`, or `None` at either end.
    pub fn neighbor(&self, from: LessonId, gesture: NavGesture) -> Option<LessonId> {
        let next = match gesture {
            NavGesture::Next => from.get().checked_add(1)?,
            NavGesture::Previous => from.get().checked_sub(1)?,
        };
        self.get(LessonId::new(next)).map(|lesson| lesson.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_has_eleven_lessons() {
        let catalog = LessonCatalog::default();
        assert_eq!(catalog.lessons().len(), 11);
        assert_eq!(catalog.first().path, "./aulas/aula1.md");
        let last = catalog.get(LessonId::new(11)).unwrap();
        assert_eq!(last.path, "./aulas/aula11.md");
        assert_eq!(last.title, "Aula 11");
        assert!(catalog.get(LessonId::new(0)).is_none());
        assert!(catalog.get(LessonId::new(12)).is_none());
    }

    #[test]
    fn progress_is_share_of_catalog() {
        let catalog = LessonCatalog::default();
        for n in 1..=11u32 {
            let expected = f64::from(n) / 11.0 * 100.0;
            assert_eq!(catalog.progress_percent(LessonId::new(n)), expected);
        }
        assert_eq!(catalog.progress_percent(LessonId::new(11)), 100.0);
    }

    #[test]
    fn gestures_map_arrows_and_letters() {
        assert_eq!(NavGesture::from_key("ArrowRight"), Some(NavGesture::Next));
        assert_eq!(NavGesture::from_key("n"), Some(NavGesture::Next));
        assert_eq!(NavGesture::from_key("ArrowLeft"), Some(NavGesture::Previous));
        assert_eq!(NavGesture::from_key("p"), Some(NavGesture::Previous));
        assert_eq!(NavGesture::from_key("N"), None);
        assert_eq!(NavGesture::from_key("Enter"), None);
    }

    #[test]
    fn neighbor_stops_at_both_ends() {
        let catalog = LessonCatalog::default();
        let first = LessonId::new(1);
        let last = LessonId::new(11);
        assert_eq!(catalog.neighbor(first, NavGesture::Previous), None);
        assert_eq!(catalog.neighbor(last, NavGesture::Next), None);
        assert_eq!(
            catalog.neighbor(first, NavGesture::Next),
            Some(LessonId::new(2))
        );
        assert_eq!(
            catalog.neighbor(last, NavGesture::Previous),
            Some(LessonId::new(10))
        );
    }

    #[test]
    fn parses_catalog_json_and_fills_titles() {
        let raw = r#"{"lessons":[
            {"id":2,"path":"./aulas/two.md"},
            {"id":1,"path":"./aulas/one.md","title":"Intro"}
        ]}"#;
        let catalog = LessonCatalog::from_json(raw).unwrap();
        assert_eq!(catalog.lessons().len(), 2);
        assert_eq!(catalog.first().title, "Intro");
        assert_eq!(catalog.get(LessonId::new(2)).unwrap().title, "Aula 2");
        assert_eq!(catalog.progress_percent(LessonId::new(1)), 50.0);
    }

    #[test]
    fn rejects_gapped_or_empty_catalogs() {
        let gapped = r#"{"lessons":[{"id":1,"path":"a.md"},{"id":3,"path":"c.md"}]}"#;
        assert!(matches!(
            LessonCatalog::from_json(gapped),
            Err(CatalogError::Gap {
                expected: 2,
                found: 3
            })
        ));
        assert!(matches!(
            LessonCatalog::from_json(r#"{"lessons":[]}"#),
            Err(CatalogError::Empty)
        ));
        assert!(matches!(
            LessonCatalog::from_json("not json"),
            Err(CatalogError::Json(_))
        ));
    }
}
