// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;

use crate::model::Ref;

use super::{FetchError, HitKind, Library, Link, SearchHit, SearchResponse, TextData};

#[derive(Debug, Clone)]
struct Book {
    categories: Vec<String>,
    chapters: Vec<Vec<String>>,
}

/// A small in-process corpus: numbered chapters of verses, links per section and a
/// list of sheets, with optional simulated latency.
#[derive(Debug, Clone, Default)]
pub struct MemoryLibrary {
    books: HashMap<String, Book>,
    links: HashMap<String, Vec<Link>>,
    sheets: Vec<(String, String)>,
    unavailable: HashSet<String>,
    text_delay: Option<Duration>,
    search_delays: HashMap<String, Duration>,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_book(mut self, title: &str, categories: &[&str], chapters: &[&[&str]]) -> Self {
        self.books.insert(
            title.to_owned(),
            Book {
                categories: categories.iter().map(|c| (*c).to_owned()).collect(),
                chapters: chapters
                    .iter()
                    .map(|verses| verses.iter().map(|v| (*v).to_owned()).collect())
                    .collect(),
            },
        );
        self
    }

    pub fn with_link(mut self, link: Link) -> Self {
        let section = link.anchor_ref.section_ref().normalized();
        self.links.entry(section).or_default().push(link);
        self
    }

    pub fn with_sheet(mut self, id: &str, content: &str) -> Self {
        self.sheets.push((id.to_owned(), content.to_owned()));
        self
    }

    /// Every fetch of `book` fails as if the backend were down.
    pub fn with_unavailable(mut self, book: &str) -> Self {
        self.unavailable.insert(book.to_owned());
        self
    }

    pub fn with_text_delay(mut self, delay: Duration) -> Self {
        self.text_delay = Some(delay);
        self
    }

    pub fn with_search_delay(mut self, query: &str, delay: Duration) -> Self {
        self.search_delays.insert(query.to_owned(), delay);
        self
    }

    /// Genesis and Exodus (three short chapters each) with a few Rashi/Ramban links.
    pub fn sample() -> Self {
        let commentary = |anchor: &str, commentator: &str, verse: u32| -> Option<Link> {
            let anchor_ref = Ref::new(anchor).ok()?;
            let source_ref = Ref::new(format!("{commentator} on {anchor}:1")).ok()?;
            Some(Link {
                anchor_ref,
                source_ref,
                category: "Commentary".to_owned(),
                commentator: commentator.to_owned(),
                anchor_verse: verse,
                commentary_num: 1.0,
            })
        };

        let mut library = Self::new()
            .with_book(
                "Genesis",
                &["Tanach", "Torah"],
                &[
                    &["In the beginning", "The earth was unformed", "Let there be light"],
                    &["The heaven and the earth were finished", "On the seventh day"],
                    &["The serpent was more subtle", "And the woman said", "Where are you"],
                ],
            )
            .with_book(
                "Exodus",
                &["Tanach", "Torah"],
                &[
                    &["These are the names", "Reuben, Simeon, Levi"],
                    &["A man of the house of Levi", "The woman conceived"],
                    &["Moses kept the flock", "The angel appeared"],
                ],
            )
            .with_sheet("sheet-1", "On light and the first day");

        let links = [
            commentary("Genesis 1:1", "Rashi", 1),
            commentary("Genesis 1:1", "Ramban", 1),
            commentary("Genesis 1:3", "Rashi", 3),
            commentary("Genesis 2:2", "Rashi", 2),
            commentary("Exodus 3:2", "Ramban", 2),
        ];
        for link in links.into_iter().flatten() {
            library = library.with_link(link);
        }
        library
    }

    fn book(&self, title: &str) -> Result<&Book, FetchError> {
        if self.unavailable.contains(title) {
            return Err(FetchError::Unavailable(format!("'{title}' is offline")));
        }
        self.books.get(title).ok_or_else(|| FetchError::NotFound(title.to_owned()))
    }

    fn chapter_ref(title: &str, chapter: usize) -> Option<Ref> {
        Ref::new(format!("{title} {chapter}")).ok()
    }

    fn text_for(&self, reference: &Ref) -> Result<TextData, FetchError> {
        let parsed = reference.parsed();
        let title = parsed.book();
        let book = self.book(title)?;
        let not_found = || FetchError::NotFound(reference.to_string());

        let chapter_of = |sections: &[smol_str::SmolStr]| -> Result<usize, FetchError> {
            match sections.first() {
                None => Ok(1),
                Some(raw) => raw.parse::<usize>().map_err(|_| not_found()),
            }
        };
        let first = chapter_of(parsed.sections())?;
        let last = chapter_of(parsed.to_sections())?;
        if first == 0 || last < first || last > book.chapters.len() {
            return Err(not_found());
        }

        // Book-only refs resolve to their first chapter.
        let canonical = if parsed.sections().is_empty() {
            Self::chapter_ref(title, 1).ok_or_else(not_found)?
        } else {
            reference.canonical()
        };

        let text = book.chapters[first - 1..last].iter().flatten().cloned().collect::<Vec<_>>();
        let spanning_refs = if last > first {
            (first..=last).filter_map(|chapter| Self::chapter_ref(title, chapter)).collect()
        } else {
            Vec::new()
        };
        let canonical_parsed = canonical.parsed();

        Ok(TextData {
            book: title.to_owned(),
            categories: book.categories.clone(),
            he: Vec::new(),
            sections: canonical_parsed.sections().iter().map(ToString::to_string).collect(),
            to_sections: canonical_parsed.to_sections().iter().map(ToString::to_string).collect(),
            text_depth: 2,
            next: (last < book.chapters.len())
                .then(|| Self::chapter_ref(title, last + 1))
                .flatten(),
            prev: (first > 1).then(|| Self::chapter_ref(title, first - 1)).flatten(),
            is_spanning: !spanning_refs.is_empty(),
            spanning_refs,
            text,
            reference: canonical,
        })
    }
}

#[async_trait]
impl Library for MemoryLibrary {
    async fn fetch_text(
        &self,
        reference: &Ref,
        _with_context: bool,
    ) -> Result<TextData, FetchError> {
        if let Some(delay) = self.text_delay {
            tokio::time::sleep(delay).await;
        }
        self.text_for(reference)
    }

    async fn fetch_links(&self, section: &Ref) -> Result<Vec<Link>, FetchError> {
        if let Some(delay) = self.text_delay {
            tokio::time::sleep(delay).await;
        }
        self.book(section.book())?;
        Ok(self.links.get(&section.normalized()).cloned().unwrap_or_default())
    }

    async fn fetch_toc_html(&self, book: &str) -> Result<String, FetchError> {
        let found = self.book(book)?;
        let mut html = String::from("<ul class=\"toc\">");
        for chapter in 1..=found.chapters.len() {
            html.push_str(&format!("<li>{book} {chapter}</li>"));
        }
        html.push_str("</ul>");
        Ok(html)
    }

    async fn search(&self, query: &str, size: usize) -> Result<SearchResponse, FetchError> {
        if let Some(delay) = self.search_delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        let needle = query.to_lowercase();

        let mut titles = self.books.keys().collect::<Vec<_>>();
        titles.sort();
        let mut hits = Vec::new();
        for title in titles {
            let book = &self.books[title];
            for (chapter, verses) in book.chapters.iter().enumerate() {
                for (verse, content) in verses.iter().enumerate() {
                    if content.to_lowercase().contains(&needle) {
                        hits.push(SearchHit {
                            kind: HitKind::Text,
                            source: format!("{title} {}:{}", chapter + 1, verse + 1),
                            content: content.clone(),
                            duplicates: Vec::new(),
                        });
                    }
                }
            }
        }
        for (id, content) in &self.sheets {
            if content.to_lowercase().contains(&needle) {
                hits.push(SearchHit {
                    kind: HitKind::Sheet,
                    source: id.clone(),
                    content: content.clone(),
                    duplicates: Vec::new(),
                });
            }
        }

        let total = hits.len() as u64;
        hits.truncate(size);
        Ok(SearchResponse { total, hits })
    }
}
