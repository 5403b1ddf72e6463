//! Free-text answer cleaning.
//!
//! Respondents typed whatever they liked into the form, so numbers are pulled
//! out of the text with a digit-run regex rather than parsed directly.

use lazy_static::lazy_static;
use regex::Regex;

use crate::survey::RawResponse;

lazy_static! {
    // ASCII digits only; other scripts' numerals are left as text.
    static ref DIGIT_RUN: Regex = Regex::new(r"[0-9]+").unwrap();
}

/// A survey row with its numeric answers extracted. Any field can be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanResponse {
    pub zip: Option<String>,
    pub country: Option<String>,
    pub birth_year: Option<i32>,
    pub peak_hate_age: Option<i32>,
}

/// Returns the first run of digits in `text`.
pub fn first_integer(text: &str) -> Option<&str> {
    DIGIT_RUN.find(text).map(|m| m.as_str())
}

/// Averages every run of digits in `text`, so "8 to 10" becomes 9.
///
/// Halves round to even. Runs are summed as `f64`, so an oversized run still
/// counts toward the mean instead of being dropped.
pub fn mean_of_integers(text: &str) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0u32;

    for m in DIGIT_RUN.find_iter(text) {
        sum += m.as_str().parse::<f64>().ok()?;
        n += 1;
    }

    (n > 0).then(|| (sum / n as f64).round_ties_even())
}

pub fn clean_birth_year(text: &str) -> Option<i32> {
    first_integer(text)?.parse().ok()
}

/// Mean age from the answer; a mean that does not fit `i32` is absent.
pub fn clean_peak_hate_age(text: &str) -> Option<i32> {
    let age = mean_of_integers(text)?;
    (age.is_finite() && age >= i32::MIN as f64 && age <= i32::MAX as f64).then(|| age as i32)
}

pub fn clean_response(raw: &RawResponse) -> CleanResponse {
    let country = raw.country.trim();

    CleanResponse {
        zip: first_integer(&raw.zip).map(str::to_string),
        country: (!country.is_empty()).then(|| country.to_string()),
        birth_year: clean_birth_year(&raw.birth_year),
        peak_hate_age: clean_peak_hate_age(&raw.peak_hate),
    }
}

pub fn clean_responses(raw: &[RawResponse]) -> Vec<CleanResponse> {
    raw.iter().map(clean_response).collect()
}
