//! Metadata cascade: release date, runtime, genres, vocabulary countries,
//! then whatever other places are left.
//!
//! Each stage removes what it recognised from a private working copy before
//! the next stage runs, so the place stage only sees what nobody claimed.
//! The flattened text handed back in [`Metadata::flattened`] is the
//! untouched pre-cascade copy.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};
use tracing::debug;

use crate::pipeline::WorkingText;
use crate::text::{self, is_padding, Stopwords};
use crate::vocabulary::Vocabulary;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:er)?\s+(\p{L}+)\.?\s+(\d{4})\b").unwrap()
});
static RUNTIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*h(?:\s*(\d{1,2}))?[^¤]*").unwrap()
});
static PLACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{L}[\p{L}\p{M}'’\- ]*").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub flattened: Option<String>,
    /// `YYYY/MM/DD`
    pub release_date: Option<String>,
    pub runtime_minutes: Option<u32>,
    pub genres: BTreeSet<String>,
    pub release_places: BTreeSet<String>,
}

pub fn extract(raw: &str, vocabulary: &Vocabulary, stopwords: &Stopwords) -> Metadata {
    let flat = text::normalize(raw, true);
    let mut work = WorkingText::new(flat.as_str());

    let before = work.char_len();
    let release_date = work.take_first_matching(&DATE_RE, parse_date);
    work.log_carve("release_date", before);

    let before = work.char_len();
    let runtime_minutes = work.take_first_matching(&RUNTIME_RE, parse_runtime);
    work.log_carve("runtime", before);

    let before = work.char_len();
    let genres = carve_terms(&mut work, vocabulary.genre_pattern(), |g| vocabulary.canonical_genre(g));
    work.log_carve("genres", before);

    // whole country names go before stopword stripping can split "Corée du Sud"
    let before = work.char_len();
    let mut release_places =
        carve_terms(&mut work, vocabulary.country_pattern(), |c| vocabulary.canonical_country(c));
    work.log_carve("countries", before);
    release_places.extend(places(&work, vocabulary, stopwords));

    let flattened = Some(flat.trim_matches(is_padding))
        .filter(|f| !f.is_empty())
        .map(str::to_string);

    Metadata {
        flattened,
        release_date: release_date.map(|d| d.format("%Y/%m/%d").to_string()),
        runtime_minutes,
        genres,
        release_places,
    }
}

fn parse_date(caps: &Captures) -> Option<NaiveDate> {
    let day: u32 = caps[1].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    let Some(month) = month_number(&caps[2]) else {
        debug!(token = &caps[0], "date-like text with unknown month");
        return None;
    };
    let date = NaiveDate::from_ymd_opt(year, month, day);
    if date.is_none() {
        debug!(token = &caps[0], "invalid calendar date");
    }
    date
}

/// French month names and abbreviations, plus English names.
fn month_number(word: &str) -> Option<u32> {
    let word = word.to_lowercase();
    let month = match word.trim_end_matches('.') {
        "janvier" | "janv" | "jan" | "january" => 1,
        "février" | "fevrier" | "févr" | "fevr" | "fév" | "fev" | "feb" | "february" => 2,
        "mars" | "mar" | "march" => 3,
        "avril" | "avr" | "apr" | "april" => 4,
        "mai" | "may" => 5,
        "juin" | "jun" | "june" => 6,
        "juillet" | "juil" | "jul" | "july" => 7,
        "août" | "aout" | "aoû" | "aug" | "august" => 8,
        "septembre" | "sept" | "sep" | "september" => 9,
        "octobre" | "oct" | "october" => 10,
        "novembre" | "nov" | "november" => 11,
        "décembre" | "decembre" | "déc" | "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

/// `"<H>h<M>"` to `H * 60 + M`.
fn parse_runtime(caps: &Captures) -> Option<u32> {
    let hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    Some(hours * 60 + minutes)
}

fn carve_terms<'v, F>(work: &mut WorkingText, pattern: Option<&Regex>, canonical: F) -> BTreeSet<String>
where
    F: Fn(&str) -> Option<&'v str>,
{
    match pattern {
        Some(re) => work
            .remove_where(re)
            .iter()
            .filter_map(|term| canonical(term.as_str()))
            .map(str::to_string)
            .collect(),
        None => BTreeSet::new(),
    }
}

fn places(work: &WorkingText, vocabulary: &Vocabulary, stopwords: &Stopwords) -> BTreeSet<String> {
    let remaining = stopwords.strip(work.as_str());
    text::all_matches(&PLACE_RE, &remaining)
        .into_iter()
        .map(|p| p.trim_matches(['-', '\'', '’', ' ']).to_string())
        .filter(|p| p.chars().count() > 1)
        .map(|p| match vocabulary.canonical_country(&p) {
            Some(country) => country.to_string(),
            None => p,
        })
        .collect()
}
