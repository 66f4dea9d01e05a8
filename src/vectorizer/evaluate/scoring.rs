use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{error::RankError, utils::datastruct::vector::SparseVector};

/// Similarity score of one candidate.
///
/// `Unranked` means one side had zero norm, so no direction to compare.
/// It sorts below every scored entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Score {
    Scored(f64),
    Unranked,
}

impl Score {
    #[inline]
    pub fn value(&self) -> Option<f64> {
        match self {
            Score::Scored(v) => Some(*v),
            Score::Unranked => None,
        }
    }

    #[inline]
    pub fn is_ranked(&self) -> bool {
        matches!(self, Score::Scored(_))
    }

    /// Total order: `Unranked` < any score, scores by `f64::total_cmp`
    pub fn total_cmp(&self, other: &Score) -> Ordering {
        match (self, other) {
            (Score::Scored(a), Score::Scored(b)) => a.total_cmp(b),
            (Score::Scored(_), Score::Unranked) => Ordering::Greater,
            (Score::Unranked, Score::Scored(_)) => Ordering::Less,
            (Score::Unranked, Score::Unranked) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Scored(v) => write!(f, "{:.4}", v),
            Score::Unranked => write!(f, "-"),
        }
    }
}

/// Cosine similarity.
/// Dot product over shared keys divided by the product of both full norms.
pub fn cosine(a: &SparseVector, b: &SparseVector) -> Score {
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Score::Unranked;
    }
    Score::Scored(a.dot(b) / (norm_a * norm_b))
}

/// Ordering criterion of a ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortKey {
    /// cosine score
    #[default]
    Relevance,
    /// popularity counter
    Popularity,
    /// last update timestamp
    Date,
}

impl FromStr for SortKey {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortKey::Relevance),
            "popularity" => Ok(SortKey::Popularity),
            "date" => Ok(SortKey::Date),
            _ => Err(RankError::UnknownSortKey(s.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortKey::Relevance => "Relevance",
            SortKey::Popularity => "Popularity",
            SortKey::Date => "Date",
        };
        f.write_str(name)
    }
}

/// Anything the ranker can order
pub trait Rankable: Sync {
    fn vector(&self) -> &SparseVector;
    fn popularity(&self) -> i64;
    fn updated(&self) -> DateTime<Utc>;
}

impl<T: Rankable> Rankable for &T {
    fn vector(&self) -> &SparseVector {
        (**self).vector()
    }

    fn popularity(&self) -> i64 {
        (**self).popularity()
    }

    fn updated(&self) -> DateTime<Utc> {
        (**self).updated()
    }
}

/// One ranked candidate
#[derive(Debug)]
pub struct RankEntry<'a, T> {
    pub item: &'a T,
    pub score: Score,
}

impl<T> Clone for RankEntry<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RankEntry<'_, T> {}

/// Ranked candidates
#[derive(Debug)]
pub struct Hits<'a, T> {
    pub list: Vec<RankEntry<'a, T>>,
}

impl<'a, T: Rankable> Hits<'a, T> {
    pub fn new(list: Vec<RankEntry<'a, T>>) -> Self {
        Hits { list }
    }

    /// Stable sort, descending by `key`
    pub fn sort_by(&mut self, key: SortKey) -> &mut Self {
        match key {
            SortKey::Relevance => self.list.sort_by(|a, b| b.score.total_cmp(&a.score)),
            SortKey::Popularity => self
                .list
                .sort_by(|a, b| b.item.popularity().cmp(&a.item.popularity())),
            SortKey::Date => self.list.sort_by(|a, b| b.item.updated().cmp(&a.item.updated())),
        }
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// Score every candidate against `query` and order them by `key`.
/// Equal keys keep the candidates' input order.
pub fn rank<'a, T: Rankable>(query: &SparseVector, candidates: &'a [T], key: SortKey) -> Hits<'a, T> {
    let query_norm = query.norm();
    let list = candidates
        .par_iter()
        .map(|item| RankEntry {
            item,
            score: cosine_with_norm(query, query_norm, item.vector()),
        })
        .collect();
    let mut hits = Hits::new(list);
    hits.sort_by(key);
    hits
}

/// cosine with the query norm computed once per ranking
#[inline]
fn cosine_with_norm(query: &SparseVector, query_norm: f64, doc: &SparseVector) -> Score {
    let doc_norm = doc.norm();
    if query_norm == 0.0 || doc_norm == 0.0 {
        return Score::Unranked;
    }
    Score::Scored(query.dot(doc) / (query_norm * doc_norm))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    struct Item {
        id: &'static str,
        vector: SparseVector,
        popularity: i64,
        day: u32,
    }

    impl Rankable for Item {
        fn vector(&self) -> &SparseVector {
            &self.vector
        }
        fn popularity(&self) -> i64 {
            self.popularity
        }
        fn updated(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 1, self.day, 0, 0, 0).unwrap()
        }
    }

    fn sv(pairs: &[(&str, f64)]) -> SparseVector {
        pairs.iter().copied().collect()
    }

    fn item(id: &'static str, pairs: &[(&str, f64)], popularity: i64, day: u32) -> Item {
        Item { id, vector: sv(pairs), popularity, day }
    }

    fn ids(hits: &Hits<'_, Item>) -> Vec<&'static str> {
        hits.list.iter().map(|e| e.item.id).collect()
    }

    #[test]
    fn cosine_is_symmetric_and_self_similar() {
        let a = sv(&[("graph", 0.3), ("neural", 0.7), ("net", 0.1)]);
        let b = sv(&[("neural", 0.2), ("vision", 0.9)]);
        assert_eq!(cosine(&a, &b), cosine(&b, &a));
        let self_sim = cosine(&a, &a).value().unwrap();
        assert!((self_sim - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_vector_is_unranked() {
        let a = sv(&[("x", 1.0)]);
        assert_eq!(cosine(&a, &SparseVector::new()), Score::Unranked);
        assert_eq!(cosine(&SparseVector::new(), &SparseVector::new()), Score::Unranked);
        assert_eq!(cosine(&a, &sv(&[("y", 1.0)])), Score::Scored(0.0));
    }

    #[test]
    fn relevance_puts_unranked_last_and_keeps_ties_stable() {
        let items = vec![
            item("empty", &[], 0, 1),
            item("off", &[("vision", 1.0)], 0, 1),
            item("hit", &[("nlp", 1.0)], 0, 1),
            item("off2", &[("robot", 1.0)], 0, 1),
        ];
        let query = sv(&[("nlp", 1.0)]);
        let hits = rank(&query, &items, SortKey::Relevance);
        assert_eq!(ids(&hits), vec!["hit", "off", "off2", "empty"]);
        assert_eq!(hits.list[3].score, Score::Unranked);
        assert!(hits.list[1].score.is_ranked());
        assert!(!hits.list[3].score.is_ranked());
    }

    #[test]
    fn popularity_and_date_orders() {
        let items = vec![
            item("a", &[("x", 1.0)], 3, 5),
            item("b", &[("x", 1.0)], 9, 2),
            item("c", &[("x", 1.0)], 3, 9),
        ];
        let query = sv(&[("x", 1.0)]);
        assert_eq!(ids(&rank(&query, &items, SortKey::Popularity)), vec!["b", "a", "c"]);
        assert_eq!(ids(&rank(&query, &items, SortKey::Date)), vec!["c", "a", "b"]);
    }

    #[test]
    fn sort_key_parses_case_insensitively() {
        assert_eq!("Relevance".parse::<SortKey>(), Ok(SortKey::Relevance));
        assert_eq!("popularity".parse::<SortKey>(), Ok(SortKey::Popularity));
        assert_eq!(" DATE ".parse::<SortKey>(), Ok(SortKey::Date));
        assert_eq!(
            "stars".parse::<SortKey>(),
            Err(RankError::UnknownSortKey("stars".to_string()))
        );
    }
}
