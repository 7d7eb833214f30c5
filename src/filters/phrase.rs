use regex::{Regex, RegexBuilder};

use crate::error::Result;

/// Phrase predicate applied to a record's speaker and body text
///
/// Both modes ignore case. An empty phrase matches everything.
#[derive(Debug, Clone, Default)]
pub enum PhraseFilter {
    #[default]
    Any,
    /// Lowercased literal substring
    Substring(String),
    Pattern(Regex),
}

impl PhraseFilter {
    pub fn new(phrase: &str, use_pattern: bool) -> Result<Self> {
        if phrase.is_empty() {
            return Ok(PhraseFilter::Any);
        }
        if use_pattern {
            let regex = RegexBuilder::new(phrase).case_insensitive(true).build()?;
            Ok(PhraseFilter::Pattern(regex))
        } else {
            Ok(PhraseFilter::Substring(phrase.to_lowercase()))
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            PhraseFilter::Any => true,
            PhraseFilter::Substring(needle) => text.to_lowercase().contains(needle.as_str()),
            PhraseFilter::Pattern(regex) => regex.is_match(text),
        }
    }
}
