//! Compiles a raw search term and its flags into an immutable [`NameMatcher`].
//!
//! Anchors: a leading `^` restricts the match to the start of the filename,
//! a trailing `$` to its end, and both together mean the filename must equal
//! the text between them. `-e` asks for equality directly and composes with
//! either anchor to the same effect. Matching always looks at the final path
//! component only.

use crate::entry::CatalogEntry;
use crate::error::{Result, SearchfsError};
use crate::traits::Matcher;

/// Longest accepted search term, in bytes (`PATH_MAX` on macOS).
pub const MAX_TERM_LEN: usize = 1024;

/// How the filename is compared against the term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Substring,
    Prefix,
    Suffix,
    Exact,
}

/// A compiled filename pattern.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    mode: MatchMode,
    case_sensitive: bool,
    negate: bool,
    needle: String,
}

impl NameMatcher {
    /// Compile `term` with the given flags.
    ///
    /// In negate mode the term is a literal substring: anchors are not
    /// interpreted and `exact` is ignored.
    ///
    /// # Errors
    ///
    /// [`SearchfsError::EmptyTerm`] if the term is empty before or after
    /// anchor stripping, [`SearchfsError::TermTooLong`] if it exceeds
    /// [`MAX_TERM_LEN`] bytes.
    pub fn compile(term: &str, exact: bool, case_sensitive: bool, negate: bool) -> Result<Self> {
        if term.is_empty() {
            return Err(SearchfsError::EmptyTerm);
        }
        if term.len() > MAX_TERM_LEN {
            return Err(SearchfsError::TermTooLong {
                len: term.len(),
                max: MAX_TERM_LEN,
            });
        }

        let (mode, stripped) = if negate {
            if exact {
                log::warn!("exact match is ignored for negated searches");
            }
            (MatchMode::Substring, term)
        } else {
            let (prefix, rest) = match term.strip_prefix('^') {
                Some(rest) => (true, rest),
                None => (false, term),
            };
            let (suffix, rest) = match rest.strip_suffix('$') {
                Some(rest) => (true, rest),
                None => (false, rest),
            };
            let mode = match (prefix, suffix) {
                _ if exact => MatchMode::Exact,
                (true, true) => MatchMode::Exact,
                (true, false) => MatchMode::Prefix,
                (false, true) => MatchMode::Suffix,
                (false, false) => MatchMode::Substring,
            };
            (mode, rest)
        };

        if stripped.is_empty() {
            return Err(SearchfsError::EmptyTerm);
        }

        let needle = if case_sensitive {
            stripped.to_owned()
        } else {
            stripped.to_lowercase()
        };

        Ok(Self {
            mode,
            case_sensitive,
            negate,
            needle,
        })
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn negate(&self) -> bool {
        self.negate
    }

    /// The comparison text, anchor-stripped and case-folded as compiled.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Test a bare filename.
    pub fn matches_name(&self, name: &str) -> bool {
        let folded;
        let name = if self.case_sensitive {
            name
        } else {
            folded = name.to_lowercase();
            &folded
        };

        let hit = match self.mode {
            MatchMode::Substring => name.contains(&self.needle),
            MatchMode::Prefix => name.starts_with(&self.needle),
            MatchMode::Suffix => name.ends_with(&self.needle),
            MatchMode::Exact => name == self.needle,
        };
        hit != self.negate
    }
}

impl Matcher for NameMatcher {
    fn is_match(&self, entry: &CatalogEntry) -> bool {
        self.matches_name(&entry.name)
    }
}
