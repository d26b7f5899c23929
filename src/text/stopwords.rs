//! Stopword corpus injected into the place stage.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use regex::Regex;

use super::alternation;
use crate::error::Result;

const FRENCH: &str = include_str!("../../data/stopwords_fr.txt");

#[derive(Debug, Clone)]
pub struct Stopwords {
    words: BTreeSet<String>,
    pattern: Option<Regex>,
}

impl Stopwords {
    /// Built-in French corpus.
    pub fn french() -> Self {
        Self::from_words(FRENCH.lines())
    }

    /// One word per line; blank lines and `#` comments are ignored.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_words(content.lines()))
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty() && !w.starts_with('#'))
            .collect();
        Self::compile(words)
    }

    pub fn with_extra<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.words.len();
        self.words.extend(
            extra
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty()),
        );
        if self.words.len() == before {
            return self;
        }
        Self::compile(self.words)
    }

    fn compile(words: BTreeSet<String>) -> Self {
        let pattern = alternation(&words)
            .map(|alt| Regex::new(&format!(r"(?i)\b(?:{alt})\b")))
            .transpose()
            .unwrap_or_else(|e| {
                // escaped literals always compile; only the size limit can trip
                tracing::warn!(error = %e, words = words.len(), "stopword pattern rejected");
                None
            });
        Self { words, pattern }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Remove every whole-word, case-insensitive stopword occurrence.
    pub fn strip(&self, text: &str) -> String {
        match &self.pattern {
            Some(re) => re.replace_all(text, "").into_owned(),
            None => text.to_string(),
        }
    }
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::french()
    }
}
