use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::stop_words::is_stop_word;

/// Coarse part of speech used to pick a lemmatization rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Adjective,
    Noun,
    Verb,
    Adverb,
}

impl PartOfSpeech {
    /// Map a Penn Treebank tag by its first letter.
    /// Anything that is not J/N/V/R falls back to noun.
    pub fn from_tag(tag: &str) -> Self {
        match tag.chars().next() {
            Some('J') => PartOfSpeech::Adjective,
            Some('V') => PartOfSpeech::Verb,
            Some('R') => PartOfSpeech::Adverb,
            _ => PartOfSpeech::Noun,
        }
    }
}

/// (form, tag, lemma) for forms the suffix rules get wrong
const IRREGULAR_FORMS: &[(&str, &str, &str)] = &[
    // verbs
    ("am", "VBP", "be"), ("is", "VBZ", "be"), ("are", "VBP", "be"), ("was", "VBD", "be"),
    ("were", "VBD", "be"), ("been", "VBN", "be"), ("being", "VBG", "be"),
    ("has", "VBZ", "have"), ("had", "VBD", "have"), ("having", "VBG", "have"),
    ("does", "VBZ", "do"), ("did", "VBD", "do"), ("done", "VBN", "do"), ("doing", "VBG", "do"),
    ("goes", "VBZ", "go"), ("went", "VBD", "go"), ("gone", "VBN", "go"),
    ("made", "VBD", "make"), ("ran", "VBD", "run"), ("took", "VBD", "take"),
    ("taken", "VBN", "take"), ("gave", "VBD", "give"), ("given", "VBN", "give"),
    ("found", "VBD", "find"), ("got", "VBD", "get"), ("gotten", "VBN", "get"),
    ("showed", "VBD", "show"), ("shown", "VBN", "show"), ("knew", "VBD", "know"),
    ("known", "VBN", "know"), ("saw", "VBD", "see"), ("seen", "VBN", "see"),
    ("seeing", "VBG", "see"), ("built", "VBD", "build"), ("brought", "VBD", "bring"),
    ("thought", "VBD", "think"), ("led", "VBD", "lead"), ("felt", "VBD", "feel"),
    ("kept", "VBD", "keep"), ("left", "VBD", "leave"), ("meant", "VBD", "mean"),
    ("held", "VBD", "hold"), ("wrote", "VBD", "write"), ("written", "VBN", "write"),
    ("writing", "VBG", "write"), ("chose", "VBD", "choose"), ("chosen", "VBN", "choose"),
    ("choosing", "VBG", "choose"), ("grew", "VBD", "grow"), ("grown", "VBN", "grow"),
    ("drew", "VBD", "draw"), ("drawn", "VBN", "draw"), ("began", "VBD", "begin"),
    ("begun", "VBN", "begin"), ("beginning", "VBG", "begin"), ("fell", "VBD", "fall"),
    ("fallen", "VBN", "fall"), ("said", "VBD", "say"), ("paid", "VBD", "pay"),
    ("sent", "VBD", "send"), ("spent", "VBD", "spend"), ("told", "VBD", "tell"),
    ("understood", "VBD", "understand"), ("created", "VBD", "create"),
    ("creating", "VBG", "create"), ("died", "VBD", "die"), ("dying", "VBG", "die"),
    ("lied", "VBD", "lie"), ("lying", "VBG", "lie"), ("tied", "VBD", "tie"),
    ("tying", "VBG", "tie"), ("learnt", "VBD", "learn"), ("taught", "VBD", "teach"),
    ("sought", "VBD", "seek"), ("caught", "VBD", "catch"), ("bought", "VBD", "buy"),
    ("fed", "VBD", "feed"), ("embed", "VB", "embed"), ("bring", "VB", "bring"),
    ("sing", "VB", "sing"),
    // nouns
    ("children", "NNS", "child"), ("men", "NNS", "man"), ("women", "NNS", "woman"),
    ("feet", "NNS", "foot"), ("teeth", "NNS", "tooth"), ("mice", "NNS", "mouse"),
    ("geese", "NNS", "goose"), ("indices", "NNS", "index"), ("matrices", "NNS", "matrix"),
    ("vertices", "NNS", "vertex"), ("analyses", "NNS", "analysis"),
    ("hypotheses", "NNS", "hypothesis"), ("theses", "NNS", "thesis"), ("bases", "NNS", "basis"),
    ("axes", "NNS", "axis"), ("crises", "NNS", "crisis"), ("criteria", "NNS", "criterion"),
    ("phenomena", "NNS", "phenomenon"), ("appendices", "NNS", "appendix"),
    ("corpora", "NNS", "corpus"), ("formulae", "NNS", "formula"), ("leaves", "NNS", "leaf"),
    ("lives", "NNS", "life"), ("halves", "NNS", "half"), ("wolves", "NNS", "wolf"),
    ("need", "NN", "need"), ("speed", "NN", "speed"), ("seed", "NN", "seed"),
    ("feed", "NN", "feed"), ("hundred", "CD", "hundred"), ("thing", "NN", "thing"),
    ("string", "NN", "string"), ("king", "NN", "king"), ("ring", "NN", "ring"),
    ("wing", "NN", "wing"), ("spring", "NN", "spring"), ("morning", "NN", "morning"),
    ("evening", "NN", "evening"), ("ceiling", "NN", "ceiling"), ("news", "NN", "news"),
    ("physics", "NN", "physics"), ("mathematics", "NN", "mathematics"),
    ("economics", "NN", "economics"), ("series", "NN", "series"), ("species", "NN", "species"),
    ("lens", "NN", "lens"),
    // adjectives
    ("better", "JJR", "good"), ("best", "JJS", "good"), ("worse", "JJR", "bad"),
    ("worst", "JJS", "bad"), ("greater", "JJR", "great"), ("greatest", "JJS", "great"),
    ("higher", "JJR", "high"), ("highest", "JJS", "high"), ("lower", "JJR", "low"),
    ("lowest", "JJS", "low"), ("smaller", "JJR", "small"), ("smallest", "JJS", "small"),
    ("larger", "JJR", "large"), ("largest", "JJS", "large"), ("faster", "JJR", "fast"),
    ("fastest", "JJS", "fast"), ("simpler", "JJR", "simple"), ("simplest", "JJS", "simple"),
    ("easier", "JJR", "easy"), ("easiest", "JJS", "easy"), ("harder", "JJR", "hard"),
    ("hardest", "JJS", "hard"), ("stronger", "JJR", "strong"), ("strongest", "JJS", "strong"),
    ("deeper", "JJR", "deep"), ("deepest", "JJS", "deep"), ("longer", "JJR", "long"),
    ("longest", "JJS", "long"), ("newer", "JJR", "new"), ("newest", "JJS", "new"),
    ("older", "JJR", "old"), ("oldest", "JJS", "old"),
];

static IRREGULAR: Lazy<HashMap<&'static str, (&'static str, &'static str)>> = Lazy::new(|| {
    IRREGULAR_FORMS
        .iter()
        .map(|&(form, tag, lemma)| (form, (tag, lemma)))
        .collect()
});

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ful", "ive", "able", "ible", "less", "ical", "ish", "al", "ic",
];

/// Endings after which a stripped `-ed`/`-ing` stem needs its final `e` back,
/// with the characters allowed right before the ending (`None` = anything).
const E_RESTORE: &[(&str, Option<&str>)] = &[
    ("at", Some("bcdfghjklmnpqrstvwxziu")),
    ("ut", Some("bcdfghjklmnpqrstvwxz")),
    ("as", Some("bcdfghjklmnpqrstvwxze")),
    ("os", Some("bcdfghjklmnpqrstvwxz")),
    ("ag", Some("bcdfghjklmnpqrstvwxz")),
    ("ib", Some("bcdfghjklmnpqrstvwxz")),
    ("ar", Some("bcdfghjklmnpqrstvwxz")),
    ("ur", Some("bcdfghjklmnpqrstvwxz")),
    ("ir", Some("bcdfghjklmnpqrstvwxzu")),
    ("in", Some("bcdfghjklmnpqrstvwxz")),
    ("id", Some("bcdfghjklmnpqrstvwxz")),
    ("ud", Some("bcdfghjklmnpqrstvwxz")),
    ("od", Some("bcdfghjklmnpqrstvwxz")),
    ("um", Some("bcdfghjklmnpqrstvwxz")),
    ("ac", Some("bcdfghjklmnpqrstvwxz")),
    ("ic", Some("bcdfghjklmnpqrstvwxz")),
    ("bl", None), ("cl", None), ("dl", None), ("fl", None), ("gl", None),
    ("kl", None), ("pl", None), ("tl", None), ("zl", None),
    ("iz", None), ("yz", None), ("ys", None), ("v", None),
    ("uc", None), ("rc", None), ("nc", None), ("dg", None), ("rg", None),
    ("ns", None), ("ps", None), ("rs", None),
];

/// Upper bound on tag+lemmatize rounds; rules converge in two or three
const MAX_ROUNDS: usize = 5;

#[inline]
fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

#[inline]
fn has_vowel(s: &str) -> bool {
    s.chars().any(|c| is_vowel(c) || c == 'y')
}

#[inline]
fn is_consonant(c: char) -> bool {
    c.is_ascii_alphabetic() && !is_vowel(c)
}

/// Plain words only: letters with optional internal hyphens/apostrophes
fn is_plain_word(token: &str) -> bool {
    let first_last_alpha = token.chars().next().is_some_and(char::is_alphabetic)
        && token.chars().last().is_some_and(char::is_alphabetic);
    first_last_alpha
        && token
            .chars()
            .all(|c| c.is_alphabetic() || matches!(c, '-' | '\'' | '’'))
}

/// Guess the Penn tag of a lowercased word seen without context
pub fn guess_tag(word: &str) -> &'static str {
    if let Some((tag, _)) = IRREGULAR.get(word) {
        return tag;
    }
    let len = word.chars().count();
    if len > 4 && word.ends_with("ing") && has_vowel(&word[..word.len() - 3]) {
        return "VBG";
    }
    if len > 3
        && word.ends_with("ed")
        && !word.ends_with("eed")
        && has_vowel(&word[..word.len() - 2])
    {
        return "VBD";
    }
    if len > 3 && word.ends_with("ly") {
        return "RB";
    }
    if len > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s)) {
        return "JJ";
    }
    if word.ends_with('s') {
        return "NNS";
    }
    "NN"
}

fn noun_base(word: &str) -> String {
    if word.chars().count() < 4 {
        return word.to_string();
    }
    if word.ends_with("ies") && word.chars().count() > 4 {
        return format!("{}y", &word[..word.len() - 3]);
    }
    for suffix in ["sses", "ches", "shes", "xes", "zzes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    for keep in ["ss", "us", "is", "ous", "ias"] {
        if word.ends_with(keep) {
            return word.to_string();
        }
    }
    if let Some(stem) = word.strip_suffix('s') {
        if stem.chars().count() >= 3 {
            return stem.to_string();
        }
    }
    word.to_string()
}

fn verb_base(word: &str) -> String {
    if word.chars().count() > 4 {
        if let Some(stem) = word.strip_suffix("ied") {
            return format!("{stem}y");
        }
    }
    let stem = if let Some(stem) = word.strip_suffix("ing") {
        stem
    } else if let Some(stem) = word.strip_suffix("ed") {
        if word.ends_with("eed") {
            return word.to_string();
        }
        stem
    } else {
        return noun_base(word);
    };
    if stem.chars().count() < 2 || !has_vowel(stem) {
        return word.to_string();
    }
    restore_stem(stem)
}

/// Undo consonant doubling or put back a dropped final `e`
fn restore_stem(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    let n = chars.len();

    if n >= 4 {
        let (a, b) = (chars[n - 2], chars[n - 1]);
        if a == b && is_consonant(b) && !matches!(b, 'l' | 's' | 'z') {
            return chars[..n - 1].iter().collect();
        }
    }
    // "us" -> "use"
    if n == 2 && is_vowel(chars[0]) && is_consonant(chars[1]) {
        return format!("{stem}e");
    }
    // "mak" -> "make"
    if n == 3
        && is_consonant(chars[0])
        && is_vowel(chars[1])
        && is_consonant(chars[2])
        && !matches!(chars[2], 'w' | 'x' | 'y')
    {
        return format!("{stem}e");
    }
    for (ending, before) in E_RESTORE {
        if let Some(head) = stem.strip_suffix(ending) {
            let ok = match before {
                None => true,
                Some(allowed) => head.chars().last().is_some_and(|c| allowed.contains(c)),
            };
            if ok {
                return format!("{stem}e");
            }
        }
    }
    stem.to_string()
}

/// Rule-based English lemmatizer.
///
/// Tags each token in isolation, maps the tag to a part of speech and
/// reduces the token to a base form for that part of speech. Decisions are
/// made on the lowercased form; an unchanged token keeps its original case.
/// The tag+reduce step is repeated until the word stops changing, so the
/// output is stable under re-lemmatization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lemmatizer;

impl Lemmatizer {
    pub fn new() -> Self {
        Lemmatizer
    }

    /// Base form of `word` for the given part of speech (one round)
    pub fn lemmatize_as(&self, word: &str, pos: PartOfSpeech) -> String {
        if let Some((_, lemma)) = IRREGULAR.get(word) {
            return lemma.to_string();
        }
        match pos {
            PartOfSpeech::Noun => noun_base(word),
            PartOfSpeech::Verb => verb_base(word),
            PartOfSpeech::Adjective | PartOfSpeech::Adverb => word.to_string(),
        }
    }

    /// Lemmatize a raw token.
    /// URLs, hashtags, tokens with digits and stop words pass through.
    pub fn lemmatize(&self, token: &str) -> String {
        if !is_plain_word(token) {
            return token.to_string();
        }
        let lower = token.to_lowercase();
        if is_stop_word(&lower) {
            return token.to_string();
        }
        let mut current = lower.clone();
        for _ in 0..MAX_ROUNDS {
            let pos = PartOfSpeech::from_tag(guess_tag(&current));
            let next = self.lemmatize_as(&current, pos);
            // "model's" must not lose its `s` and leave a dangling apostrophe
            if next == current || next.chars().count() < 2 || next.ends_with(['\'', '’']) {
                break;
            }
            current = next;
        }
        if current == lower {
            token.to_string()
        } else {
            current
        }
    }
}
