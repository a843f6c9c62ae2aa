// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gibberish test: the share of dictionary words among a text's tokens.

use std::sync::LazyLock;

use pagetally_core::traits::WordValidity;
use regex::Regex;

static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("token pattern should compile"));

/// Lowercase word tokens of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_REGEX
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_owned())
        .collect()
}

/// Fraction of `tokens` that are dictionary words longer than one character.
/// Zero tokens gives zero.
pub fn valid_ratio(tokens: &[String], words: &dyn WordValidity) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let valid = tokens
        .iter()
        .filter(|token| token.chars().count() > 1 && words.is_valid_word(token))
        .count();
    valid as f64 / tokens.len() as f64
}

/// Whether `text` reads as garbled extraction.
///
/// Whitespace-only text is not gibberish (it is blank, which is decided
/// elsewhere). Text with no word tokens at all is gibberish.
pub fn is_gibberish(text: &str, words: &dyn WordValidity, threshold: f64) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return true;
    }
    valid_ratio(&tokens, words) < threshold
}
