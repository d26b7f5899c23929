use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::settings::RatingLabels;
use crate::text::{self, compile_pattern};

#[derive(Debug, Clone)]
pub struct RatingPatterns {
    press: Regex,
    public: Regex,
}

impl RatingPatterns {
    pub fn new(labels: &RatingLabels) -> Result<Self> {
        Ok(Self {
            press: compile_pattern("ratings.press", &rating(&labels.press))?,
            public: compile_pattern("ratings.public", &rating(&labels.public))?,
        })
    }
}

/// Digits with at most one decimal separator right after the label word,
/// spaces and sentinels allowed in between.
fn rating(label: &str) -> String {
    format!(r"(?i){}[\s¤]*(\d+(?:[.,]\d+)?)", regex::escape(label.trim()))
}

/// `(press, public)`
pub fn extract(raw: &str, patterns: &RatingPatterns) -> (Option<f64>, Option<f64>) {
    let flat = text::normalize(raw, true);
    (score(&patterns.press, &flat), score(&patterns.public, &flat))
}

fn score(re: &Regex, flat: &str) -> Option<f64> {
    let token = text::first_match(re, flat)?;
    match token.replace(',', ".").parse::<f64>() {
        Ok(value) => Some((value * 10.0).round() / 10.0),
        Err(e) => {
            debug!(token = %token, error = %e, "unparsable rating");
            None
        }
    }
}
