//! Service facade.
//!
//! [`Recommender`] ties the pieces together: ingestion swaps in a fresh
//! vectorizer per batch, feedback updates user profiles with
//! compare-and-swap, and ranking requests go through the time-window filter,
//! the ranker and pagination.

use std::{
    fmt,
    str::FromStr,
    sync::{Arc, Mutex, PoisonError, RwLock, TryLockError},
};

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::EngineConfig,
    error::{Error, RankError, Result, StoreError},
    ingest::{run_batch, IngestReport, Paper},
    pagination::{paginate, PageInfo},
    profile::{interests::bootstrap_profile, Feedback, UserProfile},
    source::DocumentSource,
    store::{MemoryStore, VectorStore, Versioned},
    utils::datastruct::vector::SparseVector,
    vectorizer::{
        analyzer::Analyzer,
        evaluate::{
            query::Query,
            scoring::{rank, Score, SortKey},
        },
        FittedVectorizer,
    },
};

/// How far back a ranking looks, by last update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeWindow {
    Day,
    Week,
    /// 30 days
    Month,
    /// 365 days
    Year,
    #[default]
    All,
}

impl TimeWindow {
    pub fn duration(&self) -> Option<Duration> {
        match self {
            TimeWindow::Day => Some(Duration::days(1)),
            TimeWindow::Week => Some(Duration::days(7)),
            TimeWindow::Month => Some(Duration::days(30)),
            TimeWindow::Year => Some(Duration::days(365)),
            TimeWindow::All => None,
        }
    }

    /// `updated >= now - window`
    pub fn contains(&self, updated: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self.duration() {
            Some(window) => updated >= now - window,
            None => true,
        }
    }
}

impl FromStr for TimeWindow {
    type Err = RankError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(TimeWindow::Day),
            "week" => Ok(TimeWindow::Week),
            "month" => Ok(TimeWindow::Month),
            "year" => Ok(TimeWindow::Year),
            "all" => Ok(TimeWindow::All),
            _ => Err(RankError::UnknownTimeWindow(s.to_string())),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::Year => "year",
            TimeWindow::All => "all",
        };
        f.write_str(name)
    }
}

/// Typed ranking parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankRequest {
    pub time_window: TimeWindow,
    pub sort_key: SortKey,
    /// 1-based
    pub page: usize,
}

impl Default for RankRequest {
    fn default() -> Self {
        RankRequest {
            time_window: TimeWindow::All,
            sort_key: SortKey::Relevance,
            page: 1,
        }
    }
}

impl RankRequest {
    pub fn new(time_window: TimeWindow, sort_key: SortKey, page: usize) -> Self {
        RankRequest {
            time_window,
            sort_key,
            page,
        }
    }

    /// Build a request from raw presentation parameters.
    /// Page 0 is rejected; pages past the end are left to pagination.
    pub fn parse(time_window: &str, sort_key: &str, page: usize) -> std::result::Result<Self, RankError> {
        let time_window = time_window.parse()?;
        let sort_key = sort_key.parse()?;
        if page == 0 {
            return Err(RankError::OutOfRangePage {
                page,
                total_pages: 0,
            });
        }
        Ok(RankRequest::new(time_window, sort_key, page))
    }
}

/// One page of a ranking
#[derive(Debug, Clone)]
pub struct RankedPage<'a> {
    pub papers: Vec<&'a Paper>,
    pub scores: Vec<Score>,
    pub info: PageInfo,
    /// sort key actually applied
    pub sort_key: SortKey,
}

impl<'a> RankedPage<'a> {
    pub fn into_parts(self) -> (Vec<&'a Paper>, Vec<Score>, PageInfo) {
        (self.papers, self.scores, self.info)
    }

    pub fn is_out_of_range(&self) -> bool {
        self.info.is_out_of_range()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a Paper, Score)> + '_ {
        self.papers.iter().copied().zip(self.scores.iter().copied())
    }
}

/// Paper recommendation service.
///
/// Paper vectors and user profiles live in two [`VectorStore`]s; paper
/// metadata is kept in an in-process catalog.
pub struct Recommender<P = MemoryStore, U = MemoryStore<UserProfile>>
where
    P: VectorStore,
    U: VectorStore<UserProfile>,
{
    config: EngineConfig,
    analyzer: Analyzer,
    vectorizer: RwLock<Option<Arc<FittedVectorizer>>>,
    ingest_lock: Mutex<()>,
    catalog: RwLock<IndexMap<String, Paper>>,
    paper_vectors: P,
    user_vectors: U,
}

impl Recommender {
    /// Recommender over two fresh in-memory stores
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::new(config, MemoryStore::new(), MemoryStore::new())
    }
}

impl<P, U> Recommender<P, U>
where
    P: VectorStore,
    U: VectorStore<UserProfile>,
{
    pub fn new(config: EngineConfig, paper_vectors: P, user_vectors: U) -> Self {
        Recommender {
            config,
            analyzer: Analyzer::new(),
            vectorizer: RwLock::new(None),
            ingest_lock: Mutex::new(()),
            catalog: RwLock::new(IndexMap::new()),
            paper_vectors,
            user_vectors,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn paper_store(&self) -> &P {
        &self.paper_vectors
    }

    pub fn user_store(&self) -> &U {
        &self.user_vectors
    }

    /// Vectorizer of the latest ingested batch
    pub fn current_vectorizer(&self) -> Option<Arc<FittedVectorizer>> {
        self.vectorizer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every ingested paper, in ingestion order
    pub fn papers(&self) -> Vec<Paper> {
        self.catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn paper(&self, id: &str) -> Option<Paper> {
        self.catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Fetch, vectorize and store every document updated since `since`.
    ///
    /// Only one batch runs at a time; a concurrent call fails with
    /// [`Error::IngestInProgress`]. A page-capped run (debug mode) stores
    /// nothing, and a failed vector write rolls back the vectors already
    /// written by the batch, leaving catalog and vectorizer untouched.
    pub fn ingest<D: DocumentSource>(&self, source: D, since: DateTime<Utc>) -> Result<IngestReport> {
        let _guard = match self.ingest_lock.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(Error::IngestInProgress),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        let outcome = run_batch(source, since, &self.config)?;
        if outcome.report.dry_run {
            info!(indexed = outcome.report.indexed, "debug mode, batch not persisted");
            return Ok(outcome.report);
        }

        self.store_paper_vectors(&outcome.papers)?;
        {
            let mut catalog = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
            for mut paper in outcome.papers {
                // a re-ingested paper keeps its popularity
                if let Some(existing) = catalog.get(&paper.id) {
                    paper.popularity = existing.popularity;
                }
                catalog.insert(paper.id.clone(), paper);
            }
        }
        if let Some(fitted) = outcome.vectorizer {
            let vocabulary = fitted.vocabulary_len();
            *self.vectorizer.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(fitted));
            info!(vocabulary, "swapped in new vectorizer");
        }
        Ok(outcome.report)
    }

    /// Write every paper vector of a batch, or none of them
    fn store_paper_vectors(&self, papers: &[Paper]) -> Result<()> {
        let mut written: Vec<(&str, Option<SparseVector>)> = Vec::with_capacity(papers.len());
        for paper in papers {
            let step = self.paper_vectors.get_vector(&paper.id).and_then(|previous| {
                self.paper_vectors
                    .put_vector(&paper.id, paper.vector.clone())
                    .map(|_| previous.map(Versioned::into_value))
            });
            match step {
                Ok(previous) => written.push((paper.id.as_str(), previous)),
                Err(err) => {
                    warn!(paper = %paper.id, error = %err, written = written.len(), "paper write failed, rolling back batch");
                    // newest first, so a repeated id ends at its oldest value
                    for (id, previous) in written.into_iter().rev() {
                        let undo = match previous {
                            Some(vector) => self.paper_vectors.put_vector(id, vector).map(|_| ()),
                            None => self.paper_vectors.remove_vector(id).map(|_| ()),
                        };
                        if let Err(undo_err) = undo {
                            warn!(paper = id, error = %undo_err, "rollback write failed");
                        }
                    }
                    return Err(err.into());
                }
            }
        }
        Ok(())
    }

    /// Stored profile of `user_id`; empty when the user has none yet
    pub fn user_profile(&self, user_id: &str) -> Result<SparseVector> {
        Ok(self
            .user_vectors
            .get_vector(user_id)?
            .map(|r| r.value.vector)
            .unwrap_or_default())
    }

    /// Papers `user_id` currently likes, in like order
    pub fn liked_papers(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(self
            .user_vectors
            .get_vector(user_id)?
            .map(|r| r.value.liked.into_iter().collect())
            .unwrap_or_default())
    }

    /// Replace the profile of `user_id` with one built from interest tags.
    /// Earlier likes are forgotten with the old profile.
    pub fn bootstrap_interests<T: AsRef<str>>(&self, user_id: &str, interests: &[T]) -> Result<SparseVector> {
        let profile = bootstrap_profile(&self.analyzer, interests)?;
        self.user_vectors
            .put_vector(user_id, UserProfile::from_vector(profile.clone()))?;
        info!(user = user_id, terms = profile.len(), "bootstrapped profile");
        Ok(profile)
    }

    /// Move the profile of `user_id` toward (like) or away from (unlike) a
    /// paper and return the stored result.
    ///
    /// Liking an already liked paper and unliking a paper that is not liked
    /// leave the profile as it is. Retries on write conflicts up to
    /// `max_write_retries` times, re-reading the profile each time.
    pub fn apply_feedback(&self, user_id: &str, paper_id: &str, liked: bool) -> Result<SparseVector> {
        let document = self
            .paper_vectors
            .get_vector(paper_id)?
            .ok_or_else(|| Error::PaperNotFound(paper_id.to_string()))?
            .value;
        let feedback = Feedback::from_liked(liked);
        let params = match feedback {
            Feedback::Like => self.config.like,
            Feedback::Unlike => self.config.unlike,
        };

        let attempts = self.config.max_write_retries;
        for attempt in 1..=attempts {
            let (expected, mut user) = match self.user_vectors.get_vector(user_id)? {
                Some(record) => (Some(record.version), record.value),
                None => (None, UserProfile::default()),
            };
            if !user.apply_feedback(paper_id, &document, feedback, params) {
                debug!(user = user_id, paper = paper_id, ?feedback, "feedback matches current state, ignored");
                return Ok(user.vector);
            }
            match self.user_vectors.compare_and_put(user_id, expected, user) {
                Ok(record) => {
                    debug!(user = user_id, paper = paper_id, ?feedback, version = record.version, "profile updated");
                    return Ok(record.value.vector);
                }
                Err(StoreError::WriteConflict { .. }) => {
                    warn!(user = user_id, attempt, "profile write conflict, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(Error::RetriesExhausted {
            key: user_id.to_string(),
            attempts,
        })
    }

    /// Rank `candidates` against a user profile
    pub fn rank_for_user<'a>(
        &self,
        profile: &SparseVector,
        candidates: &'a [Paper],
        request: &RankRequest,
    ) -> RankedPage<'a> {
        self.rank_at(profile, candidates, request, Utc::now())
    }

    /// Rank `candidates` against the stored profile of `user_id`
    pub fn recommend<'a>(
        &self,
        user_id: &str,
        candidates: &'a [Paper],
        request: &RankRequest,
    ) -> Result<RankedPage<'a>> {
        let profile = self.user_profile(user_id)?;
        Ok(self.rank_for_user(&profile, candidates, request))
    }

    /// Rank `candidates` against free text.
    /// The query vector holds raw term counts of the analyzed text.
    pub fn rank_for_query<'a>(
        &self,
        raw_query: &str,
        candidates: &'a [Paper],
        request: &RankRequest,
    ) -> RankedPage<'a> {
        let query = Query::parse(&self.analyzer, raw_query);
        debug!(tokens = ?query.tokens(), "parsed query");
        self.rank_at(&query.to_vector(), candidates, request, Utc::now())
    }

    /// Ranking with an explicit clock
    pub fn rank_at<'a>(
        &self,
        vector: &SparseVector,
        candidates: &'a [Paper],
        request: &RankRequest,
        now: DateTime<Utc>,
    ) -> RankedPage<'a> {
        let in_window: Vec<&'a Paper> = candidates
            .iter()
            .filter(|p| request.time_window.contains(p.meta.updated, now))
            .collect();

        let sort_key = if vector.is_empty() && request.sort_key == SortKey::Relevance {
            debug!("empty vector, ordering by date");
            SortKey::Date
        } else {
            request.sort_key
        };

        let hits = rank(vector, &in_window, sort_key);
        let ranked: Vec<(&'a Paper, Score)> = hits.list.iter().map(|e| (*e.item, e.score)).collect();
        let page = paginate(&ranked, request.page, self.config.page_size);

        RankedPage {
            papers: page.items.iter().map(|(p, _)| *p).collect(),
            scores: page.items.iter().map(|(_, s)| *s).collect(),
            info: page.info,
            sort_key,
        }
    }
}
