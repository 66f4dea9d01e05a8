//! Document sources.
//!
//! A source serves raw documents page by page, newest update first. The batch
//! fetcher walks those pages until it runs out of documents or reaches the
//! ones that were already ingested.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::SourceError;

/// Paper metadata carried alongside the text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperMeta {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, rename = "abstract")]
    pub summary: String,
    #[serde(default)]
    pub pdf_link: Option<String>,
    #[serde(default)]
    pub site_link: Option<String>,
    pub updated: DateTime<Utc>,
    pub submitted: DateTime<Utc>,
}

/// One document as delivered by a source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: String,
    /// full text to vectorize
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub meta: PaperMeta,
}

impl RawDocument {
    /// Reject documents that cannot be shown or vectorized
    pub fn validate(&self) -> Result<(), SourceError> {
        let invalid = |reason: &str| SourceError::InvalidDocument {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.id.trim().is_empty() {
            return Err(invalid("empty id"));
        }
        if self.meta.title.trim().is_empty() {
            return Err(invalid("empty title"));
        }
        if self.text.trim().is_empty() {
            return Err(invalid("empty text"));
        }
        if self.meta.updated < self.meta.submitted {
            return Err(invalid("updated before submitted"));
        }
        Ok(())
    }
}

/// One page of a source: items can fail individually
pub type SourcePage = Vec<Result<RawDocument, SourceError>>;

/// Paged access to documents, newest update first
pub trait DocumentSource {
    /// Up to `page_size` documents starting at `start_index`.
    /// An empty page means there is nothing more.
    fn fetch_page(&self, start_index: usize, page_size: usize) -> Result<SourcePage, SourceError>;
}

impl<S: DocumentSource + ?Sized> DocumentSource for &S {
    fn fetch_page(&self, start_index: usize, page_size: usize) -> Result<SourcePage, SourceError> {
        (**self).fetch_page(start_index, page_size)
    }
}

/// Lazy walk over the pages of a [`DocumentSource`].
///
/// Stops at
/// - an empty page
/// - the first item updated before `since`
/// - a page-level error (yielded once)
/// - `max_pages` pages, when set
///
/// Item-level errors are yielded and the walk continues.
pub struct BatchFetcher<S> {
    source: S,
    since: DateTime<Utc>,
    page_size: usize,
    max_pages: Option<usize>,
    start_index: usize,
    pages_fetched: usize,
    buffer: std::vec::IntoIter<Result<RawDocument, SourceError>>,
    done: bool,
}

/// Start a batch walk over `source` for documents updated at or after `since`
pub fn fetch_batch<S: DocumentSource>(source: S, since: DateTime<Utc>, page_size: usize) -> BatchFetcher<S> {
    BatchFetcher {
        source,
        since,
        page_size: page_size.max(1),
        max_pages: None,
        start_index: 0,
        pages_fetched: 0,
        buffer: Vec::new().into_iter(),
        done: false,
    }
}

impl<S: DocumentSource> BatchFetcher<S> {
    /// Stop after `pages` pages
    pub fn max_pages(mut self, pages: Option<usize>) -> Self {
        self.max_pages = pages;
        self
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn next_page(&mut self) -> Option<Result<RawDocument, SourceError>> {
        if self.max_pages.is_some_and(|max| self.pages_fetched >= max) {
            debug!(pages = self.pages_fetched, "page cap reached");
            self.done = true;
            return None;
        }
        match self.source.fetch_page(self.start_index, self.page_size) {
            Ok(page) if page.is_empty() => {
                debug!(start_index = self.start_index, "source exhausted");
                self.done = true;
                None
            }
            Ok(page) => {
                self.pages_fetched += 1;
                self.start_index += self.page_size;
                self.buffer = page.into_iter();
                self.next()
            }
            Err(err) => {
                error!(start_index = self.start_index, error = %err, "page fetch failed, ending batch");
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<S: DocumentSource> Iterator for BatchFetcher<S> {
    type Item = Result<RawDocument, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.buffer.next() {
            Some(Ok(doc)) if doc.meta.updated < self.since => {
                debug!(id = %doc.id, updated = %doc.meta.updated, "reached already ingested documents");
                self.done = true;
                None
            }
            Some(Ok(doc)) => Some(Ok(doc)),
            Some(Err(err)) => {
                warn!(error = %err, "skipping source item");
                Some(Err(err))
            }
            None => self.next_page(),
        }
    }
}

/// In-memory source over a fixed document list.
///
/// Documents are served newest update first, like an arXiv query sorted by
/// last update.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: Vec<RawDocument>,
}

impl StaticSource {
    pub fn new(mut documents: Vec<RawDocument>) -> Self {
        documents.sort_by(|a, b| b.meta.updated.cmp(&a.meta.updated));
        StaticSource { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentSource for StaticSource {
    fn fetch_page(&self, start_index: usize, page_size: usize) -> Result<SourcePage, SourceError> {
        Ok(self
            .documents
            .iter()
            .skip(start_index)
            .take(page_size)
            .cloned()
            .map(Ok)
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeZone;

    use super::*;

    pub(crate) fn doc(id: &str, day: u32, text: &str) -> RawDocument {
        let at = Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
        RawDocument {
            id: id.to_string(),
            text: text.to_string(),
            meta: PaperMeta {
                title: format!("Paper {id}"),
                authors: vec!["A. Author".to_string()],
                summary: text.to_string(),
                pdf_link: None,
                site_link: Some(format!("https://arxiv.org/abs/{id}")),
                updated: at,
                submitted: at,
            },
        }
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 0, 0, 0).unwrap()
    }

    /// source that fails on a chosen page and serves a bad item
    struct FlakySource {
        inner: StaticSource,
        fail_at: usize,
    }

    impl DocumentSource for FlakySource {
        fn fetch_page(&self, start_index: usize, page_size: usize) -> Result<SourcePage, SourceError> {
            if start_index >= self.fail_at {
                return Err(SourceError::Fetch {
                    start_index,
                    reason: "timeout".to_string(),
                });
            }
            let mut page = self.inner.fetch_page(start_index, page_size)?;
            page.push(Err(SourceError::InvalidDocument {
                id: "bad".to_string(),
                reason: "schema".to_string(),
            }));
            Ok(page)
        }
    }

    #[test]
    fn validation_rejects_empty_fields() {
        assert!(doc("1", 1, "text").validate().is_ok());
        assert!(doc("1", 1, "  ").validate().is_err());
        let mut d = doc("1", 1, "text");
        d.meta.title.clear();
        assert!(matches!(d.validate(), Err(SourceError::InvalidDocument { .. })));
    }

    #[test]
    fn static_source_serves_newest_first() {
        let source = StaticSource::new(vec![doc("old", 1, "a"), doc("new", 9, "b"), doc("mid", 5, "c")]);
        let page = source.fetch_page(0, 2).unwrap();
        let ids: Vec<_> = page.into_iter().map(|d| d.unwrap().id).collect();
        assert_eq!(ids, vec!["new", "mid"]);
        assert!(source.fetch_page(3, 2).unwrap().is_empty());
    }

    #[test]
    fn batch_stops_at_documents_older_than_since() {
        let source = StaticSource::new((1..=9).map(|d| doc(&d.to_string(), d, "x")).collect());
        let ids: Vec<String> = fetch_batch(&source, day(5), 2)
            .map(|r| r.unwrap().id)
            .collect();
        assert_eq!(ids, vec!["9", "8", "7", "6", "5"]);
    }

    #[test]
    fn batch_walks_every_page_until_empty() {
        let source = StaticSource::new((1..=5).map(|d| doc(&d.to_string(), d, "x")).collect());
        let mut fetcher = fetch_batch(&source, day(1), 2);
        assert_eq!(fetcher.by_ref().count(), 5);
        assert_eq!(fetcher.pages_fetched(), 3);
    }

    #[test]
    fn page_cap_limits_the_walk() {
        let source = StaticSource::new((1..=5).map(|d| doc(&d.to_string(), d, "x")).collect());
        let n = fetch_batch(&source, day(1), 2).max_pages(Some(1)).count();
        assert_eq!(n, 2);
    }

    #[test]
    fn item_errors_continue_and_page_errors_end_the_batch() {
        let source = FlakySource {
            inner: StaticSource::new((1..=5).map(|d| doc(&d.to_string(), d, "x")).collect()),
            fail_at: 4,
        };
        let results: Vec<_> = fetch_batch(&source, day(1), 2).collect();
        // page 0: 2 docs + bad, page 2: 2 docs + bad, page 4: fetch error
        assert_eq!(results.len(), 7);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 4);
        assert!(matches!(results.last(), Some(Err(SourceError::Fetch { start_index: 4, .. }))));
    }
}
