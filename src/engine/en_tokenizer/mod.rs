//! English text normalization: social-text tokenizer, single-token
//! part-of-speech guess, rule-based lemmatizer and stop list.

pub mod lemma;
pub mod stop_words;
pub mod tokenizer;

pub use lemma::{Lemmatizer, PartOfSpeech};
pub use stop_words::is_stop_word;
pub use tokenizer::SocialTokenizer;
