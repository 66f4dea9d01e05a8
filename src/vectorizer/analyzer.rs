use crate::{
    engine::en_tokenizer::{is_stop_word, Lemmatizer, SocialTokenizer},
    vectorizer::token::TokenFrequency,
};

/// Text → token stream.
///
/// tokenize → content filter → lemmatize → lowercase → stopword removal.
///
/// The analyzer is a pure function of its input. The same instance is used to
/// build a corpus and later to turn queries and interest labels into tokens,
/// so both sides go through identical normalization.
///
/// # Examples
/// ```
/// use paper_rank::Analyzer;
/// let analyzer = Analyzer::new();
/// assert_eq!(analyzer.analyze("Cats are great pets"), vec!["cat", "great", "pet"]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Analyzer {
    tokenizer: SocialTokenizer,
    lemmatizer: Lemmatizer,
}

impl Analyzer {
    pub fn new() -> Self {
        Analyzer {
            tokenizer: SocialTokenizer::new(),
            lemmatizer: Lemmatizer::new(),
        }
    }

    /// Tokens of `text` in order of appearance, duplicates kept
    pub fn analyze(&self, text: &str) -> Vec<String> {
        self.tokenizer
            .candidate_tokens(text)
            .into_iter()
            .map(|tok| self.lemmatizer.lemmatize(tok).to_lowercase())
            .filter(|tok| !is_stop_word(tok))
            .collect()
    }

    /// Occurrence counts of the analyzed tokens
    pub fn term_frequency(&self, text: &str) -> TokenFrequency {
        let mut freq = TokenFrequency::new();
        freq.add_tokens(&self.analyze(text));
        freq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_matches_expected_tokens() {
        let a = Analyzer::new();
        assert_eq!(a.analyze("Cats are great pets."), vec!["cat", "great", "pet"]);
        assert_eq!(a.analyze("Dogs are loyal pets."), vec!["dog", "loyal", "pet"]);
        assert_eq!(a.analyze("Quantum computing is hard."), vec!["quantum", "compute", "hard"]);
    }

    #[test]
    fn drops_stop_words_numbers_and_single_letters() {
        let a = Analyzer::new();
        assert_eq!(a.analyze("The 3 x of a model"), vec!["model"]);
        assert!(a.analyze("   ").is_empty());
    }

    #[test]
    fn lowercases_after_lemmatizing() {
        let a = Analyzer::new();
        assert_eq!(a.analyze("GAN Networks"), vec!["gan", "network"]);
    }

    #[test]
    fn term_frequency_counts_repeats() {
        let a = Analyzer::new();
        let freq = a.term_frequency("graphs and graph neural graphs");
        assert_eq!(freq.token_count("graph"), 3);
        assert_eq!(freq.token_count("neural"), 1);
    }
}
