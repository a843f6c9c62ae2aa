// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word lists for the gibberish test: plain one-word-per-line files or
// hunspell `.dic` dictionaries.

use std::collections::HashSet;
use std::path::Path;

use pagetally_core::error::TallyError;
use pagetally_core::traits::WordValidity;
use tracing::{info, instrument};

/// Inflectional endings tried when a token is not listed verbatim. Hunspell
/// `.dic` files list stems and leave inflection to the affix file.
const SUFFIXES: &[&str] = &["ing", "est", "es", "ed", "er", "ly", "s", "d"];

/// A lowercase set of known words.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    /// Load a word list or hunspell `.dic` from disk.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TallyError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|err| {
            TallyError::Dictionary(format!("cannot read {}: {}", path.display(), err))
        })?;
        // Older hunspell files are ISO-8859-1; lossy decoding keeps the ASCII
        // entries intact.
        let list = Self::parse(&String::from_utf8_lossy(&bytes));
        if list.is_empty() {
            return Err(TallyError::Dictionary(format!(
                "{} contains no words",
                path.display()
            )));
        }
        info!(words = list.len(), "dictionary loaded");
        Ok(list)
    }

    /// Parse dictionary text. A leading all-digit line (the hunspell entry
    /// count) is skipped and `/FLAGS` suffixes are dropped.
    pub fn parse(contents: &str) -> Self {
        let mut lines = contents.lines().peekable();
        if lines
            .peek()
            .is_some_and(|first| {
                let first = first.trim();
                !first.is_empty() && first.chars().all(|c| c.is_ascii_digit())
            })
        {
            lines.next();
        }

        let words = lines
            .filter_map(|line| {
                let entry = line.split(['/', '\t']).next().unwrap_or("").trim();
                (!entry.is_empty() && !entry.starts_with('#')).then(|| entry.to_lowercase())
            })
            .collect();
        Self { words }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|word| word.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    fn contains_stem(&self, token: &str) -> bool {
        SUFFIXES.iter().any(|suffix| {
            let Some(stem) = token.strip_suffix(suffix) else {
                return false;
            };
            if stem.chars().count() < 2 {
                return false;
            }
            // "baked" -> "bak" + "e", "nicer" -> "nic" + "e"
            self.words.contains(stem) || self.words.contains(&format!("{stem}e"))
        })
    }
}

impl WordValidity for WordList {
    fn is_valid_word(&self, token: &str) -> bool {
        self.contains(token) || self.contains_stem(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn hunspell_format_is_parsed() {
        let list = WordList::parse("4\nhello/MS\nWorld\ninvoice/SDG\nPage\n");
        assert_eq!(list.len(), 4);
        assert!(list.contains("hello"));
        assert!(list.contains("world"));
        assert!(list.contains("invoice"));
        assert!(!list.contains("4"));
    }

    #[test]
    fn plain_list_keeps_every_line() {
        let list = WordList::parse("alpha\n\nbeta\n  gamma  \n");
        assert_eq!(list.len(), 3);
        assert!(list.contains("gamma"));
    }

    #[test]
    fn inflected_forms_match_their_stem() {
        let list = WordList::from_words(["invoice", "page", "bill", "quick"]);
        assert!(list.is_valid_word("invoices"));
        assert!(list.is_valid_word("invoiced"));
        assert!(list.is_valid_word("pages"));
        assert!(list.is_valid_word("billing"));
        assert!(list.is_valid_word("quickly"));
        assert!(!list.is_valid_word("xqzt"));
        assert!(!list.is_valid_word("s"));
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "2\nreceipt/S\ntotal").expect("write");
        let list = WordList::load(file.path()).expect("load");
        assert!(list.is_valid_word("receipts"));
        assert!(list.is_valid_word("total"));
    }

    #[test]
    fn empty_or_missing_file_is_an_error() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        assert!(matches!(
            WordList::load(file.path()),
            Err(TallyError::Dictionary(_))
        ));
        assert!(WordList::load("/nonexistent/words.dic").is_err());
    }
}
