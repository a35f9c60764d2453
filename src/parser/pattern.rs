//! Expansion of `[optional]` and `(choice|choice)` groups in alias names.

use crate::error::ParseError;
use indexmap::IndexSet;

/// Result of expanding one pattern.
///
/// `names` holds every literal form in first-seen order. When the pattern has
/// bracket errors, `names` holds whatever could still be expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub names: Vec<String>,
    pub errors: Vec<ParseError>,
}

/// Expands bracket patterns, reusing its scan stacks between calls.
///
/// Each recursion depth owns one pair of stacks (optional group starts and
/// choice group starts), so expanding many names does not allocate new
/// stacks once the deepest nesting has been seen.
#[derive(Debug, Default)]
pub struct PatternExpander {
    stacks: Vec<(Vec<usize>, Vec<usize>)>,
}

impl PatternExpander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expand(&mut self, pattern: &str) -> Expansion {
        let mut names = IndexSet::new();
        let mut errors = IndexSet::new();
        self.expand_at(pattern, 0, &mut names, &mut errors);
        Expansion {
            names: names.into_iter().collect(),
            errors: errors.into_iter().collect(),
        }
    }

    fn expand_at(
        &mut self,
        name: &str,
        depth: usize,
        names: &mut IndexSet<String>,
        errors: &mut IndexSet<ParseError>,
    ) {
        if !name.contains(['[', ']', '(', ')']) {
            names.insert(name.to_string());
            return;
        }

        if self.stacks.len() <= depth {
            self.stacks.resize_with(depth + 1, Default::default);
        }
        let (mut optionals, mut choices) = std::mem::take(&mut self.stacks[depth]);
        optionals.clear();
        choices.clear();

        let mut closed = None;
        let mut failed = false;
        for (i, c) in name.char_indices() {
            match c {
                '[' => optionals.push(i),
                '(' => choices.push(i),
                ']' | ')' => {
                    let stack = if c == ']' { &mut optionals } else { &mut choices };
                    match stack.pop() {
                        Some(start) => closed = Some((start, i, c)),
                        None => {
                            errors.insert(ParseError::TooManyBrackets {
                                offset: char_offset(name, i),
                                bracket: c,
                            });
                            failed = true;
                        }
                    }
                    // The first closed group is expanded; every other group
                    // is still present in the expanded names and is handled
                    // by recursion.
                    break;
                }
                _ => {}
            }
        }

        match closed {
            Some((start, end, ']')) => {
                let before = &name[..start];
                let inner = &name[start + 1..end];
                let after = &name[end + 1..];
                self.expand_at(&format!("{}{}{}", before, inner, after), depth + 1, names, errors);
                self.expand_at(&format!("{}{}", before, after), depth + 1, names, errors);
            }
            Some((start, end, _)) => {
                let before = &name[..start];
                let after = &name[end + 1..];
                for option in split_choices(&name[start + 1..end]) {
                    self.expand_at(&format!("{}{}{}", before, option, after), depth + 1, names, errors);
                }
            }
            None if !failed => {
                let unclosed = optionals.last().or(choices.last()).copied();
                if let Some(start) = unclosed {
                    let bracket = name[start..].chars().next().unwrap_or('[');
                    errors.insert(ParseError::NotEnoughBrackets {
                        offset: char_offset(name, start),
                        bracket,
                    });
                }
            }
            None => {}
        }

        self.stacks[depth] = (optionals, choices);
    }
}

/// Split a choice group body on `|` that is not inside a nested group.
fn split_choices(body: &str) -> Vec<&str> {
    let mut options = Vec::new();
    let mut nested = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' | '[' => nested += 1,
            ')' | ']' => nested = nested.saturating_sub(1),
            '|' if nested == 0 => {
                options.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    options.push(&body[start..]);
    options
}

fn char_offset(s: &str, byte_index: usize) -> usize {
    s[..byte_index].chars().count()
}

/// Expand a single pattern with a fresh expander.
pub fn expand_pattern(pattern: &str) -> Expansion {
    PatternExpander::new().expand(pattern)
}
