//! Window selection by title
//!
//! Picks one window out of an enumerated list from a user-supplied title
//! query. Strategies are tried per window, strongest first:
//!
//! 1. **Regex** - case-insensitive regex on the title
//! 2. **Substring** - case-insensitive substring
//! 3. **Fuzzy** - `SkimMatcherV2` score of at least [`FUZZY_THRESHOLD`]
//!
//! Among matching windows the strongest strategy wins, then the higher fuzzy
//! score, then the lexicographically smaller id, so the choice is
//! deterministic for a given list.
//!
//! Regex compilation is bounded by [`MAX_REGEX_SIZE`] and [`MAX_DFA_SIZE`];
//! a query that fails to compile just skips the regex strategy.

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use regex::{Regex, RegexBuilder};

use crate::model::WindowHandle;

/// Maximum regex pattern size (1MB)
pub const MAX_REGEX_SIZE: usize = 1_048_576;

/// Maximum DFA size (10MB)
pub const MAX_DFA_SIZE: usize = 10 * 1_048_576;

/// Minimum fuzzy match score for a positive match
pub const FUZZY_THRESHOLD: i64 = 60;

/// How a title matched, strongest last so the derived `Ord` ranks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    Fuzzy,
    Substring,
    Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MatchScore {
    kind:        MatchKind,
    fuzzy_score: i64,
}

fn compile_regex_with_limits(pattern: &str) -> Option<Regex> {
    if pattern.len() > MAX_REGEX_SIZE {
        tracing::warn!("Regex pattern too large (>1MB), skipping regex match");
        return None;
    }

    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(MAX_REGEX_SIZE)
        .dfa_size_limit(MAX_DFA_SIZE)
        .build()
        .ok()
}

/// Title matcher for a single query.
///
/// # Examples
///
/// ```
/// use cropshot_core::{
///     capture::matching::WindowMatcher,
///     model::{ScreenRect, WindowHandle},
/// };
///
/// let windows = vec![
///     WindowHandle::new("1", "Untitled - Notepad", ScreenRect::new(0, 0, 800, 600)),
///     WindowHandle::new("2", "Terminal", ScreenRect::new(0, 0, 640, 480)),
/// ];
///
/// let matcher = WindowMatcher::new("notepad");
/// assert_eq!(matcher.find(&windows).map(|w| w.id.as_str()), Some("1"));
/// ```
#[derive(Debug, Clone)]
pub struct WindowMatcher {
    query:       String,
    query_lower: String,
    regex:       Option<Regex>,
}

impl WindowMatcher {
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        let regex = compile_regex_with_limits(&query);
        Self {
            query_lower: query.to_lowercase(),
            query,
            regex,
        }
    }

    /// Best matching window, or `None` for an empty query or no match.
    pub fn find<'a>(&self, windows: &'a [WindowHandle]) -> Option<&'a WindowHandle> {
        if self.query.trim().is_empty() {
            tracing::debug!("WindowMatcher: empty query, no match");
            return None;
        }

        let fuzzy = SkimMatcherV2::default();
        let mut best: Option<(&WindowHandle, MatchScore)> = None;

        for window in windows {
            let Some(score) = self.score(&fuzzy, &window.title) else {
                continue;
            };

            let better = match best {
                None => true,
                Some((current, current_score)) => {
                    Self::is_better_match(score, &window.id, current_score, &current.id)
                }
            };
            if better {
                best = Some((window, score));
            }
        }

        match best {
            Some((window, score)) => {
                tracing::debug!(
                    id = %window.id,
                    title = %window.title,
                    kind = ?score.kind,
                    "WindowMatcher: matched window"
                );
                Some(window)
            }
            None => {
                tracing::debug!(query = %self.query, "WindowMatcher: no window matched");
                None
            }
        }
    }

    /// How `title` matches this query, if at all.
    pub fn match_kind(&self, title: &str) -> Option<MatchKind> {
        self.score(&SkimMatcherV2::default(), title).map(|s| s.kind)
    }

    fn score(&self, fuzzy: &SkimMatcherV2, title: &str) -> Option<MatchScore> {
        if let Some(regex) = &self.regex {
            if regex.is_match(title) {
                return Some(MatchScore {
                    kind:        MatchKind::Regex,
                    fuzzy_score: 0,
                });
            }
        }

        if title.to_lowercase().contains(&self.query_lower) {
            return Some(MatchScore {
                kind:        MatchKind::Substring,
                fuzzy_score: 0,
            });
        }

        match fuzzy.fuzzy_match(title, &self.query) {
            Some(score) if score >= FUZZY_THRESHOLD => {
                tracing::trace!(title, score, "Fuzzy match");
                Some(MatchScore {
                    kind:        MatchKind::Fuzzy,
                    fuzzy_score: score,
                })
            }
            _ => None,
        }
    }

    fn is_better_match(
        candidate: MatchScore,
        candidate_id: &str,
        best: MatchScore,
        best_id: &str,
    ) -> bool {
        if candidate.kind != best.kind {
            return candidate.kind > best.kind;
        }

        if candidate.fuzzy_score != best.fuzzy_score {
            return candidate.fuzzy_score > best.fuzzy_score;
        }

        candidate_id < best_id
    }
}
