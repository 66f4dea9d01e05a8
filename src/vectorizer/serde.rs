//! CBOR persistence for a fitted vocabulary.
//!
//! The analyzer is stateless and is rebuilt on load, so only the idf table,
//! the batch size and the truncation length are stored.

use crate::{
    error::VectorizeError,
    vectorizer::{analyzer::Analyzer, FittedVectorizer},
};

impl<E> FittedVectorizer<E> {
    /// Encode as CBOR
    pub fn to_cbor(&self) -> Result<Vec<u8>, VectorizeError> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Decode from CBOR produced by [`FittedVectorizer::to_cbor`]
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, VectorizeError> {
        let mut fitted: FittedVectorizer<E> = serde_cbor::from_slice(bytes)?;
        fitted.analyzer = Analyzer::new();
        Ok(fitted)
    }
}

#[cfg(test)]
mod tests {
    use crate::vectorizer::TfidfVectorizer;

    use super::*;

    #[test]
    fn restored_vectorizer_transforms_identically() {
        let docs = ["sparse graph learning", "dense retrieval models", "graph retrieval"];
        let fitted = TfidfVectorizer::new().fit(&docs).unwrap().vectorizer;

        let bytes = fitted.to_cbor().unwrap();
        let restored: FittedVectorizer = FittedVectorizer::from_cbor(&bytes).unwrap();

        assert_eq!(restored, fitted);
        let text = "graph models for retrieval";
        assert_eq!(restored.transform(text), fitted.transform(text));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(matches!(
            <FittedVectorizer>::from_cbor(&[0xff, 0x00, 0x13]),
            Err(VectorizeError::Serialization(_))
        ));
    }
}
