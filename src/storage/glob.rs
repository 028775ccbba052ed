//! Glob Pattern Matching for KEYS
//!
//! Supported syntax:
//! - `*` matches any run of characters, including none
//! - `?` matches exactly one character
//! - `[abc]`, `[a-z]` match one character from a class
//! - `[!abc]` or `[^abc]` match one character not in the class
//! - `\x` matches `x` literally
//!
//! A `[` with no closing `]` is matched as a literal `[`.
//! Matching is case-sensitive and works on characters, not bytes.

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: Vec<char>,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.chars().collect(),
        }
    }

    /// Returns `true` if the whole of `text` matches the pattern.
    ///
    /// Runs in `O(pattern * text)`: on a mismatch only the most recent `*`
    /// is retried, one character further along.
    pub fn matches(&self, text: &str) -> bool {
        let text: Vec<char> = text.chars().collect();
        let pattern = &self.pattern;

        let mut p = 0;
        let mut t = 0;
        // Pattern index after the last `*` and the text index it resumes from
        let mut backtrack: Option<(usize, usize)> = None;

        while t < text.len() {
            if pattern.get(p) == Some(&'*') {
                while pattern.get(p) == Some(&'*') {
                    p += 1;
                }
                backtrack = Some((p, t));
                continue;
            }

            match self.match_one(p, text[t]) {
                Some(next) => {
                    p = next;
                    t += 1;
                }
                None => match backtrack {
                    Some((star_p, star_t)) => {
                        backtrack = Some((star_p, star_t + 1));
                        p = star_p;
                        t = star_t + 1;
                    }
                    None => return false,
                },
            }
        }

        while pattern.get(p) == Some(&'*') {
            p += 1;
        }
        p == pattern.len()
    }

    /// Matches the single-character token at `p` against `c`.
    ///
    /// Returns the index of the next token, or `None` on a mismatch or at
    /// the end of the pattern.
    fn match_one(&self, p: usize, c: char) -> Option<usize> {
        let pattern = &self.pattern;

        match *pattern.get(p)? {
            '?' => Some(p + 1),
            '[' => match self.match_class(p, c) {
                Some((true, next)) => Some(next),
                Some((false, _)) => None,
                // Unterminated class
                None => (c == '[').then_some(p + 1),
            },
            '\\' if p + 1 < pattern.len() => (pattern[p + 1] == c).then_some(p + 2),
            literal => (literal == c).then_some(p + 1),
        }
    }

    /// Matches `c` against the class opening at `start`.
    ///
    /// Returns whether it matched and the index just past the closing `]`,
    /// or `None` if the class is never closed.
    fn match_class(&self, start: usize, c: char) -> Option<(bool, usize)> {
        let pattern = &self.pattern;
        let mut i = start + 1;

        let negate = matches!(pattern.get(i), Some('!') | Some('^'));
        if negate {
            i += 1;
        }

        let mut matched = false;
        let mut first = true;

        loop {
            let current = *pattern.get(i)?;

            // A `]` right after the opening is a member, not the terminator
            if current == ']' && !first {
                return Some((matched != negate, i + 1));
            }
            first = false;

            let (low, consumed) = if current == '\\' {
                (*pattern.get(i + 1)?, 2)
            } else {
                (current, 1)
            };
            i += consumed;

            let is_range = pattern.get(i) == Some(&'-')
                && pattern.get(i + 1).is_some_and(|&next| next != ']');
            if is_range {
                let high = pattern[i + 1];
                if low <= c && c <= high {
                    matched = true;
                }
                i += 2;
            } else if low == c {
                matched = true;
            }
        }
    }
}
