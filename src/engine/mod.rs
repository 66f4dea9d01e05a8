//! Language-specific text processing.

pub mod en_tokenizer;
