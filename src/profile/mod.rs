//! User profile vectors.
//!
//! A profile is a [`SparseVector`] that starts from a set of interest tags
//! and then drifts with every like or unlike:
//!
//! `P' = alpha * P + beta * D`, then entries below `gamma` are dropped.
//!
//! [`UserProfile`] is the stored per-user record: the vector plus the set of
//! papers the user currently likes, so that an unlike only undoes a like
//! that actually happened.

pub mod interests;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::utils::datastruct::vector::SparseVector;

/// Coefficients of one feedback update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackParams {
    /// decay of the current profile
    pub alpha: f64,
    /// weight of the document vector
    pub beta: f64,
    /// entries below this weight are dropped
    pub gamma: f64,
}

impl FeedbackParams {
    /// Reinforce the profile toward a document
    pub const LIKE: FeedbackParams = FeedbackParams {
        alpha: 0.95,
        beta: 0.05,
        gamma: 0.02,
    };

    /// Inverse of [`FeedbackParams::LIKE`]; the floor of 0 only drops
    /// weights that went negative.
    pub const UNLIKE: FeedbackParams = FeedbackParams {
        alpha: 1.0 / 0.95,
        beta: -0.05,
        gamma: 0.0,
    };

    pub const fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        FeedbackParams { alpha, beta, gamma }
    }
}

/// Direction of a feedback event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    Like,
    Unlike,
}

impl Feedback {
    pub fn from_liked(liked: bool) -> Self {
        if liked {
            Feedback::Like
        } else {
            Feedback::Unlike
        }
    }
}

/// Apply one feedback update and return the new profile.
///
/// Works over the union of keys. Entries with weight `< gamma` and entries
/// that net to exactly 0 are removed; a weight equal to `gamma` stays.
pub fn update_profile(
    profile: &SparseVector,
    document: &SparseVector,
    params: FeedbackParams,
) -> SparseVector {
    let mut next = profile.clone();
    let entries = next.entries_mut();
    for weight in entries.values_mut() {
        *weight *= params.alpha;
    }
    for (token, weight) in document.iter() {
        *entries.entry(token.to_string()).or_insert(0.0) += params.beta * weight;
    }
    next.prune_below(params.gamma);
    next
}

/// Stored state of one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub vector: SparseVector,
    /// ids of the papers currently liked, in like order
    pub liked: IndexSet<String>,
}

impl UserProfile {
    /// Fresh profile with no likes, e.g. from interest tags
    pub fn from_vector(vector: SparseVector) -> Self {
        UserProfile {
            vector,
            liked: IndexSet::new(),
        }
    }

    pub fn is_liked(&self, paper_id: &str) -> bool {
        self.liked.contains(paper_id)
    }

    /// Apply one feedback event for `paper_id` with document vector `document`.
    ///
    /// Liking a paper that is already liked, or unliking one that is not,
    /// changes nothing and returns `false`.
    pub fn apply_feedback(
        &mut self,
        paper_id: &str,
        document: &SparseVector,
        feedback: Feedback,
        params: FeedbackParams,
    ) -> bool {
        let changed = match feedback {
            Feedback::Like => self.liked.insert(paper_id.to_string()),
            Feedback::Unlike => self.liked.shift_remove(paper_id),
        };
        if changed {
            self.vector = update_profile(&self.vector, document, params);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sv(pairs: &[(&str, f64)]) -> SparseVector {
        pairs.iter().copied().collect()
    }

    #[test]
    fn like_on_empty_profile_keeps_heavy_terms_only() {
        let doc = sv(&[("nlp", 0.8), ("vision", 0.2)]);
        let p = update_profile(&SparseVector::new(), &doc, FeedbackParams::LIKE);
        assert_eq!(p.len(), 1);
        assert!((p.get("nlp") - 0.04).abs() < 1e-12);
    }

    #[test]
    fn no_entry_below_gamma_after_update() {
        let profile = sv(&[("a", 0.021), ("b", 0.5), ("c", 0.03)]);
        let doc = sv(&[("c", 0.1), ("d", 0.6)]);
        let p = update_profile(&profile, &doc, FeedbackParams::LIKE);
        assert!(p.iter().all(|(_, w)| w >= 0.02));
        // a decays to 0.01995 and is dropped
        assert!(!p.contains("a"));
        assert!(p.contains("d"));
    }

    #[test]
    fn weight_equal_to_gamma_is_kept() {
        let doc = sv(&[("x", 0.5)]);
        let params = FeedbackParams::new(1.0, 0.5, 0.25);
        let p = update_profile(&SparseVector::new(), &doc, params);
        assert_eq!(p.get("x"), 0.25);
    }

    #[test]
    fn unlike_drops_negative_and_zero_weights() {
        let profile = sv(&[("gan", 0.0475), ("rl", 0.3)]);
        let doc = sv(&[("gan", 1.0), ("vision", 0.4)]);
        let p = update_profile(&profile, &doc, FeedbackParams::UNLIKE);
        // gan nets out to about 0, vision goes negative
        assert!(!p.contains("vision"));
        assert!(p.iter().all(|(_, w)| w >= 0.0));
        assert!((p.get("rl") - 0.3 / 0.95).abs() < 1e-12);
    }

    #[test]
    fn unlike_then_like_restores_shared_keys() {
        let profile = sv(&[("graph", 0.6), ("nlp", 0.3), ("vision", 0.1)]);
        let doc = sv(&[("graph", 0.7), ("nlp", 0.7)]);
        let undone = update_profile(&profile, &doc, FeedbackParams::UNLIKE);
        let redone = update_profile(&undone, &doc, FeedbackParams::LIKE);
        for (token, weight) in profile.iter() {
            if redone.contains(token) {
                assert!((redone.get(token) - weight).abs() < 0.003, "{token}");
            }
        }
        assert!(redone.contains("graph") && redone.contains("nlp"));
    }

    #[test]
    fn repeated_like_is_applied_once() {
        let doc = sv(&[("arm", 0.6), ("grasp", 0.8)]);
        let mut user = UserProfile::default();
        assert!(user.apply_feedback("p1", &doc, Feedback::Like, FeedbackParams::LIKE));
        let once = user.vector.clone();
        assert!(!user.apply_feedback("p1", &doc, Feedback::Like, FeedbackParams::LIKE));
        assert_eq!(user.vector, once);
        assert!(user.is_liked("p1"));
    }

    #[test]
    fn unlike_without_like_changes_nothing() {
        let doc = sv(&[("arm", 0.6)]);
        let mut user = UserProfile::from_vector(sv(&[("robot", 1.0), ("arm", 1.0)]));
        assert!(!user.apply_feedback("p1", &doc, Feedback::Unlike, FeedbackParams::UNLIKE));
        assert_eq!(user.vector.get("robot"), 1.0);

        assert!(user.apply_feedback("p1", &doc, Feedback::Like, FeedbackParams::LIKE));
        assert!(user.apply_feedback("p1", &doc, Feedback::Unlike, FeedbackParams::UNLIKE));
        assert!(!user.is_liked("p1"));
        assert!((user.vector.get("robot") - 1.0).abs() < 1e-12);
    }
}
