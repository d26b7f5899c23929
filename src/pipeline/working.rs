use std::ops::Range;

use regex::{Captures, Regex};
use tracing::debug;

use crate::text::SENTINEL;

/// Private working copy of a field that cascading stages carve text out of,
/// so that later stages search a smaller, less ambiguous remainder.
#[derive(Debug, Clone)]
pub struct WorkingText {
    text: String,
}

impl WorkingText {
    pub fn new(text: impl Into<String>) -> Self {
        WorkingText { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Remove the first match of `re` for which `f` yields a value and return
    /// that value. Matches `f` rejects stay in place.
    pub fn take_first_matching<T, F>(&mut self, re: &Regex, f: F) -> Option<T>
    where
        F: Fn(&Captures) -> Option<T>,
    {
        let (range, value) = re.captures_iter(&self.text).find_map(|caps| {
            let whole = caps.get(0)?;
            f(&caps).map(|v| (whole.range(), v))
        })?;
        self.cut(range);
        Some(value)
    }

    /// Remove every match of `re`, returning the removed texts in order.
    pub fn remove_where(&mut self, re: &Regex) -> Vec<String> {
        let ranges: Vec<Range<usize>> = re.find_iter(&self.text).map(|m| m.range()).collect();
        let mut removed = Vec::with_capacity(ranges.len());
        // back to front so earlier ranges stay valid
        for range in ranges.into_iter().rev() {
            removed.push(self.text[range.clone()].to_string());
            self.cut(range);
        }
        removed.reverse();
        removed
    }

    /// A cut leaves a sentinel behind so the text on either side never fuses.
    fn cut(&mut self, range: Range<usize>) {
        let mut buf = [0u8; 4];
        self.text.replace_range(range, SENTINEL.encode_utf8(&mut buf));
    }

    pub(crate) fn log_carve(&self, stage: &str, before: usize) {
        let after = self.char_len();
        debug!(
            stage,
            before,
            after,
            removed = before.saturating_sub(after),
            "metadata carve-out"
        );
    }
}
