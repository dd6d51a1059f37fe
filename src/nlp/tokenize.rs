//! Rule-based sentence and word segmentation. Swap for a trained model by
//! implementing [`Tokenizer`].

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

/// Trait for sentence/word segmenters.
pub trait Tokenizer: Send + Sync {
    /// Split running text into sentences, whitespace-trimmed, none empty.
    fn sentences(&self, text: &str) -> Vec<String>;
    /// Split a sentence (or any text) into word and punctuation tokens.
    fn words(&self, text: &str) -> Vec<String>;
}

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?]+["')\]]*\s+"#).expect("valid regex"));

static WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\w+(?:[-'.]\w+)*|\.\.\.|--|[^\w\s]").expect("valid regex")
});

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "inc", "ltd",
    "corp", "approx", "dept",
];

/// Abbreviations that are also ordinary words; they only hold a sentence
/// together when a number follows, as in "No. 5" or "Mar. 3".
const NUMERIC_ABBREVIATIONS: &[&str] = &[
    "no", "fig", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov",
    "dec",
];

const CLITICS: &[&str] = &["'s", "'re", "'ve", "'ll", "'d", "'m"];

/// Treebank-flavoured tokenizer built from a handful of regular expressions.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexTokenizer;

impl RegexTokenizer {
    fn is_abbreviation(preceding: &str, following: &str) -> bool {
        let Some(word) = preceding.split_whitespace().last() else {
            return false;
        };
        let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
        let Some(stem) = word.strip_suffix('.') else {
            return false;
        };
        // single initials such as "J." in "J. Smith"
        if stem.chars().count() == 1 && stem.chars().all(char::is_alphabetic) {
            return true;
        }
        let stem = stem.to_lowercase();
        if ABBREVIATIONS.contains(&stem.as_str()) {
            return true;
        }
        NUMERIC_ABBREVIATIONS.contains(&stem.as_str())
            && following.chars().next().is_some_and(|c| c.is_ascii_digit())
    }
}

impl Tokenizer for RegexTokenizer {
    fn sentences(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for boundary in SENTENCE_END.find_iter(text) {
            let candidate = &text[start..boundary.end()];
            let rest = &text[boundary.end()..];
            let next_is_lower = rest.chars().next().is_some_and(char::is_lowercase);
            if next_is_lower || Self::is_abbreviation(candidate.trim_end(), rest) {
                continue;
            }
            let sentence = candidate.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = boundary.end();
        }
        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }
        sentences
    }

    fn words(&self, text: &str) -> Vec<String> {
        let mut words = Vec::new();
        for token in WORD.find_iter(text).map(|m| m.as_str()) {
            let lower = token.to_lowercase();
            if lower.len() > 3 && lower.ends_with("n't") {
                let cut = token.len() - 3;
                words.push(token[..cut].to_string());
                words.push(token[cut..].to_string());
                continue;
            }
            match CLITICS
                .iter()
                .find(|clitic| lower.len() > clitic.len() && lower.ends_with(*clitic))
            {
                Some(clitic) => {
                    let cut = token.len() - clitic.len();
                    words.push(token[..cut].to_string());
                    words.push(token[cut..].to_string());
                }
                None => words.push(token.to_string()),
            }
        }
        words
    }
}

/// Load the default tokenizer.
pub fn load_tokenizer() -> Arc<dyn Tokenizer> {
    Arc::new(RegexTokenizer) as Arc<dyn Tokenizer>
}
