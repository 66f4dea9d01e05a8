use once_cell::sync::Lazy;
use regex::Regex;

/// Alternatives are tried left to right at each position, so order matters:
/// URLs and emoticons must win over plain words, numbers over words.
const PATTERNS: &[&str] = &[
    // URLs
    r#"(?:https?://|www\.)[^\s<>"]*[^\s<>".,;:!?)\]]"#,
    // emoticons
    r#"[<>]?[:;=8][\-o*']?[)\](\[dDpP/:}{@|\\]"#,
    r"<3",
    // e-mail addresses
    r"[\w.+\-]+@[\w\-]+(?:\.[\w\-]+)+",
    // @mentions
    r"@\w+",
    // hashtags
    r"#+\w[\w'\-]*\w",
    // words with internal apostrophes, dashes or underscores
    r"\p{L}(?:\p{L}|['’\-_])+\p{L}",
    // numbers, fractions, decimals, times
    r"[+\-]?\d+(?:[,/.:\-]\d+[+\-]?)?",
    // plain words
    r"\w+",
    // ellipsis
    r"\.(?:\s*\.)+",
    // anything else that is not whitespace
    r"\S",
];

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    let joined = PATTERNS
        .iter()
        .map(|p| format!("(?:{p})"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&joined).expect("valid tokenizer regex")
});

/// Social-text tokenizer.
///
/// Splits on whitespace and punctuation while keeping URLs, emoticons,
/// hashtags, mentions, e-mail addresses and contractions atomic. Case is
/// preserved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SocialTokenizer;

impl SocialTokenizer {
    pub fn new() -> Self {
        SocialTokenizer
    }

    /// Split `text` into raw tokens, in order of appearance
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        TOKEN_RE.find_iter(text).map(|m| m.as_str()).collect()
    }

    /// Tokens that survive the content filters:
    /// at least one alphabetic character and more than one character long.
    pub fn candidate_tokens<'a>(&self, text: &'a str) -> Vec<&'a str> {
        TOKEN_RE
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|tok| is_candidate(tok))
            .collect()
    }
}

/// Content filter applied after tokenization
#[inline]
pub fn is_candidate(token: &str) -> bool {
    token.chars().any(char::is_alphabetic) && token.chars().nth(1).is_some()
}
