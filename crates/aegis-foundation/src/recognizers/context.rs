//! Context-word confidence enhancement
//!
//! A match preceded by a telling word ("ssn", "card", "phone") is much more
//! likely to be the real thing than a bare digit run. Recognizers carry a
//! base score and a [`ContextWords`] boost applied when any of the words
//! appears among the few words before the match.

/// Words inspected before a match.
const WINDOW_WORDS: usize = 5;

/// Words that raise a recognizer's confidence when found before a match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextWords {
    words: Vec<String>,
    boost: f64,
}

impl ContextWords {
    pub fn new(words: impl IntoIterator<Item = impl Into<String>>, boost: f64) -> Self {
        Self {
            words: words
                .into_iter()
                .map(|w| w.into().to_lowercase())
                .filter(|w| !w.trim().is_empty())
                .collect(),
            boost,
        }
    }

    /// No context words; [`score`](Self::score) returns the base unchanged.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn boost(&self) -> f64 {
        self.boost
    }

    /// Base score, plus the boost when a context word precedes `start`,
    /// clamped to `[0, 1]`.
    pub fn score(&self, text: &str, start: usize, base: f64) -> f64 {
        if self.is_empty() || !self.found_before(text, start) {
            return base.clamp(0.0, 1.0);
        }
        (base + self.boost).clamp(0.0, 1.0)
    }

    fn found_before(&self, text: &str, start: usize) -> bool {
        let Some(prefix) = text.get(..start) else {
            return false;
        };

        let mut window: Vec<String> = prefix
            .split_whitespace()
            .rev()
            .take(WINDOW_WORDS)
            .map(|w| {
                w.chars()
                    .filter(|c| c.is_alphanumeric())
                    .flat_map(char::to_lowercase)
                    .collect()
            })
            .filter(|w: &String| !w.is_empty())
            .collect();
        window.reverse();
        let joined = format!(" {} ", window.join(" "));

        self.words
            .iter()
            .any(|word| joined.contains(&format!(" {word} ")))
    }
}
