use crate::{
    error::ProfileError,
    utils::datastruct::vector::SparseVector,
    vectorizer::analyzer::Analyzer,
};

/// A selectable interest: an arXiv category with a short keyword list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestTag {
    pub code: &'static str,
    pub label: &'static str,
    pub keywords: &'static str,
}

/// Categories the ingestion pipeline pulls from
pub const INTEREST_TAGS: &[InterestTag] = &[
    InterestTag {
        code: "cs.CV",
        label: "Computer Vision",
        keywords: "image video recognition detection segmentation",
    },
    InterestTag {
        code: "cs.LG",
        label: "Machine Learning",
        keywords: "learning model training optimization generalization",
    },
    InterestTag {
        code: "cs.CL",
        label: "Computation and Language",
        keywords: "language text translation speech parsing",
    },
    InterestTag {
        code: "cs.AI",
        label: "Artificial Intelligence",
        keywords: "reasoning planning knowledge agent logic",
    },
    InterestTag {
        code: "cs.NE",
        label: "Neural and Evolutionary Computing",
        keywords: "neural evolutionary genetic spiking neuron",
    },
    InterestTag {
        code: "cs.RO",
        label: "Robotics",
        keywords: "robot manipulation navigation control locomotion",
    },
];

/// Find a tag by category code or label, ignoring case
pub fn lookup(name: &str) -> Option<&'static InterestTag> {
    let name = name.trim();
    INTEREST_TAGS
        .iter()
        .find(|tag| tag.code.eq_ignore_ascii_case(name) || tag.label.eq_ignore_ascii_case(name))
}

/// Initial profile from a set of selected interests.
///
/// Every analyzer token of the selected labels and keywords gets weight 1.0.
/// Fails on the first name that is not in [`INTEREST_TAGS`].
pub fn bootstrap_profile<T>(analyzer: &Analyzer, selected: &[T]) -> Result<SparseVector, ProfileError>
where
    T: AsRef<str>,
{
    let mut profile = SparseVector::new();
    for name in selected {
        let tag = lookup(name.as_ref())
            .ok_or_else(|| ProfileError::UnknownInterest(name.as_ref().to_string()))?;
        let text = format!("{} {}", tag.label, tag.keywords);
        for token in analyzer.analyze(&text) {
            profile.insert(token, 1.0);
        }
    }
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_code_or_label() {
        assert_eq!(lookup("cs.cv").map(|t| t.label), Some("Computer Vision"));
        assert_eq!(lookup("robotics").map(|t| t.code), Some("cs.RO"));
        assert!(lookup("astrophysics").is_none());
    }

    #[test]
    fn bootstrap_sets_unit_weights() {
        let profile = bootstrap_profile(&Analyzer::new(), &["Robotics", "cs.CV"]).unwrap();
        assert_eq!(profile.get("robot"), 1.0);
        assert_eq!(profile.get("vision"), 1.0);
        assert_eq!(profile.get("image"), 1.0);
        assert!(profile.iter().all(|(_, w)| w == 1.0));
    }

    #[test]
    fn unknown_interest_is_reported() {
        let err = bootstrap_profile(&Analyzer::new(), &["cs.CV", "Cooking"]).unwrap_err();
        assert_eq!(err, ProfileError::UnknownInterest("Cooking".to_string()));
    }

    #[test]
    fn no_selection_gives_empty_profile() {
        let none: [&str; 0] = [];
        assert!(bootstrap_profile(&Analyzer::new(), &none).unwrap().is_empty());
    }
}
