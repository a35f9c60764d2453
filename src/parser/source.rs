//! Reader for alias source files.
//!
//! Alias files are indentation-structured:
//!
//! ```text
//! # Boats
//! boats:
//!     minecraft version = 1.9 or newer
//!     {boat wood}:
//!         oak = minecraft:oak_-
//!         spruce = minecraft:spruce_-
//!     {boat wood} boat¦s = -boat
//! ```
//!
//! Lines ending in `:` open a section, `key = value` lines are entries and
//! `#` starts a comment (`##` is a literal `#`).

use crate::error::ParseError;

/// A `key = value` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryNode {
    pub key: String,
    pub value: String,
    /// 1-based line number.
    pub line: usize,
}

/// A `key:` line and everything indented below it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionNode {
    pub key: String,
    pub line: usize,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Entry(EntryNode),
    Section(SectionNode),
}

impl Node {
    pub fn line(&self) -> usize {
        match self {
            Node::Entry(entry) => entry.line,
            Node::Section(section) => section.line,
        }
    }
}

impl SectionNode {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            line: 0,
            children: Vec::new(),
        }
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.children.push(Node::Entry(EntryNode {
            key: key.into(),
            value: value.into(),
            line: 0,
        }));
        self
    }

    pub fn with_section(mut self, section: SectionNode) -> Self {
        self.children.push(Node::Section(section));
        self
    }

    /// Value of the first entry with the given key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.children.iter().find_map(|node| match node {
            Node::Entry(entry) if entry.key == key => Some(entry.value.as_str()),
            _ => None,
        })
    }

    pub fn sections(&self) -> impl Iterator<Item = &SectionNode> {
        self.children.iter().filter_map(|node| match node {
            Node::Section(section) => Some(section),
            Node::Entry(_) => None,
        })
    }
}

/// Parse a source file into a root section holding the top-level nodes.
///
/// Lines that cannot be parsed are returned as errors with their line number
/// and otherwise ignored.
pub fn parse_source(text: &str) -> (SectionNode, Vec<(usize, ParseError)>) {
    let mut errors = Vec::new();
    // (indent, section); the root has no indent
    let mut stack: Vec<(Option<usize>, SectionNode)> = vec![(None, SectionNode::default())];

    for (index, raw_line) in text.lines().enumerate() {
        let line = index + 1;
        let stripped = strip_comment(raw_line);
        let content = stripped.trim();
        if content.is_empty() {
            continue;
        }
        let indent = stripped.len() - stripped.trim_start().len();

        while stack.len() > 1 && stack.last().and_then(|(i, _)| *i).map_or(false, |i| indent <= i) {
            close_section(&mut stack);
        }

        if let Some(key) = content.strip_suffix(':').filter(|_| !content.contains('=')) {
            stack.push((
                Some(indent),
                SectionNode {
                    key: key.trim().to_string(),
                    line,
                    children: Vec::new(),
                },
            ));
        } else if let Some((key, value)) = content.split_once('=') {
            let entry = EntryNode {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
                line,
            };
            if let Some((_, section)) = stack.last_mut() {
                section.children.push(Node::Entry(entry));
            }
        } else {
            errors.push((line, ParseError::InvalidLine(content.to_string())));
        }
    }

    while stack.len() > 1 {
        close_section(&mut stack);
    }
    let root = stack.pop().map(|(_, root)| root).unwrap_or_default();
    (root, errors)
}

fn close_section(stack: &mut Vec<(Option<usize>, SectionNode)>) {
    if let Some((_, section)) = stack.pop() {
        if let Some((_, parent)) = stack.last_mut() {
            parent.children.push(Node::Section(section));
        }
    }
}

fn strip_comment(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '#' {
            if chars.peek() == Some(&'#') {
                chars.next();
                out.push('#');
                continue;
            }
            break;
        }
        out.push(c);
    }
    out
}
