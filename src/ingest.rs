//! Batch ingestion: fetch, validate, vectorize.
//!
//! One run fits a fresh vectorizer over the documents of its own batch.
//! Writing the results anywhere is left to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    config::EngineConfig,
    error::{SourceError, VectorizeError},
    source::{fetch_batch, DocumentSource, PaperMeta, RawDocument},
    utils::datastruct::vector::SparseVector,
    vectorizer::{evaluate::scoring::Rankable, FittedVectorizer, TfidfVectorizer},
};

/// A vectorized paper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub id: String,
    pub meta: PaperMeta,
    pub popularity: i64,
    pub vector: SparseVector,
}

impl Rankable for Paper {
    fn vector(&self) -> &SparseVector {
        &self.vector
    }

    fn popularity(&self) -> i64 {
        self.popularity
    }

    fn updated(&self) -> DateTime<Utc> {
        self.meta.updated
    }
}

/// Counters of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// items the source delivered, valid or not
    pub fetched: usize,
    /// items dropped by validation or source errors
    pub skipped: usize,
    /// papers vectorized
    pub indexed: usize,
    pub vocabulary: usize,
    pub pages: usize,
    /// a page fetch failed and the batch ended early
    pub truncated: bool,
    /// page-capped run whose results are not persisted
    pub dry_run: bool,
}

/// Papers and vectorizer produced by one run
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub papers: Vec<Paper>,
    /// `None` when the batch was empty
    pub vectorizer: Option<FittedVectorizer>,
    pub report: IngestReport,
}

/// Fetch every document updated at or after `since`, drop invalid ones and
/// vectorize the rest as one corpus.
///
/// An empty batch is not an error: the outcome has no papers and no
/// vectorizer.
pub fn run_batch<S: DocumentSource>(
    source: S,
    since: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<IngestOutcome, VectorizeError> {
    let mut report = IngestReport {
        dry_run: config.max_fetch_pages.is_some(),
        ..IngestReport::default()
    };
    info!(
        %since,
        mode = if report.dry_run { "debug" } else { "normal" },
        "fetching new documents"
    );

    let mut fetcher = fetch_batch(source, since, config.fetch_page_size).max_pages(config.max_fetch_pages);
    let mut documents: Vec<RawDocument> = Vec::new();
    for item in fetcher.by_ref() {
        let doc = match item {
            Ok(doc) => doc,
            Err(SourceError::Fetch { .. }) => {
                report.truncated = true;
                continue;
            }
            Err(_) => {
                report.fetched += 1;
                report.skipped += 1;
                continue;
            }
        };
        report.fetched += 1;
        if let Err(err) = doc.validate() {
            warn!(error = %err, "skipping document");
            report.skipped += 1;
            continue;
        }
        documents.push(doc);
    }
    report.pages = fetcher.pages_fetched();

    if documents.is_empty() {
        warn!(%since, "no new documents in batch");
        return Ok(IngestOutcome {
            papers: Vec::new(),
            vectorizer: None,
            report,
        });
    }

    let texts: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
    let fitted = TfidfVectorizer::new()
        .max_df(config.max_df)
        .max_vector_len(config.max_vector_len)
        .fit(&texts)?;

    let papers: Vec<Paper> = documents
        .into_iter()
        .zip(fitted.vectors)
        .map(|(doc, vector)| Paper {
            id: doc.id,
            meta: doc.meta,
            popularity: config.initial_popularity,
            vector,
        })
        .collect();

    report.indexed = papers.len();
    report.vocabulary = fitted.vectorizer.vocabulary_len();
    info!(
        indexed = report.indexed,
        skipped = report.skipped,
        vocabulary = report.vocabulary,
        "vectorized batch"
    );

    Ok(IngestOutcome {
        papers,
        vectorizer: Some(fitted.vectorizer),
        report,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::source::{tests::doc, StaticSource};

    fn since() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn vectorizes_valid_documents_and_skips_invalid_ones() {
        let source = StaticSource::new(vec![
            doc("a", 3, "Cats are great pets."),
            doc("b", 2, "Dogs are loyal pets."),
            doc("c", 1, "Quantum computing is hard."),
            doc("d", 4, "   "),
        ]);
        let outcome = run_batch(&source, since(), &EngineConfig::default()).unwrap();

        assert_eq!(outcome.report.fetched, 4);
        assert_eq!(outcome.report.skipped, 1);
        assert_eq!(outcome.report.indexed, 3);
        assert!(!outcome.report.dry_run);
        let ids: Vec<_> = outcome.papers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(outcome.papers.iter().all(|p| p.popularity == 5));
        assert!(outcome.papers[0].vector.get("cat") > 0.0);
        assert_eq!(outcome.vectorizer.unwrap().doc_num(), 3);
    }

    #[test]
    fn empty_batch_is_not_an_error() {
        let source = StaticSource::new(Vec::new());
        let outcome = run_batch(&source, since(), &EngineConfig::default()).unwrap();
        assert!(outcome.papers.is_empty());
        assert!(outcome.vectorizer.is_none());
    }

    #[test]
    fn page_cap_marks_a_dry_run() {
        let source = StaticSource::new((1..=6).map(|d| doc(&d.to_string(), d, "graph learning")).chain([doc("x", 9, "robot arms")]).collect());
        let config = EngineConfig {
            fetch_page_size: 2,
            max_fetch_pages: Some(1),
            ..EngineConfig::default()
        };
        let outcome = run_batch(&source, since(), &config).unwrap();
        assert!(outcome.report.dry_run);
        assert_eq!(outcome.report.pages, 1);
        assert_eq!(outcome.papers.len(), 2);
    }
}
