use std::collections::HashMap;

/// Tags that never contain children, with or without a self-close slash.
const VOID_TAGS: &[&str] = &[
    "img", "br", "hr", "input", "meta", "link", "area", "base", "col", "embed", "param",
    "source", "track", "wbr",
];

/// One node of the parsed HTML tree.
///
/// Text content is stored raw (still entity-encoded); decoding happens at
/// render time, never here.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Synthetic container for the whole document
    Root { children: Vec<Node> },
    /// An element with a lowercase tag name and its attributes
    Element {
        tag: String,
        attrs: HashMap<String, String>,
        children: Vec<Node>,
    },
    /// A literal text run
    Text(String),
}

/// Parses loosely-structured HTML into a best-effort tree.
///
/// Never fails: unterminated or mismatched markup degrades to whatever the
/// cursor could still make sense of.
pub fn parse(html: &str) -> Node {
    let mut parser = Parser::new(html);
    let children = parser.parse_children();
    Node::Root { children }
}

/// Single left-to-right scan over the character sequence with an explicit
/// cursor. Nesting is handled by the call stack, nothing else.
struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(html: &str) -> Self {
        Parser {
            chars: html.chars().collect(),
            pos: 0,
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// True if the characters at the cursor match `needle` exactly.
    fn lookahead(&self, needle: &str) -> bool {
        let mut i = self.pos;
        for c in needle.chars() {
            if self.chars.get(i) != Some(&c) {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Accumulates child nodes until a closing tag or end of input.
    fn parse_children(&mut self) -> Vec<Node> {
        let mut children = Vec::new();
        while !self.eof() {
            if self.lookahead("</") {
                // The caller decides what to do with the closing tag.
                break;
            }
            if self.lookahead("<!--") {
                self.skip_comment();
                continue;
            }
            if self.peek() == Some('<') {
                children.push(self.parse_element());
            } else if let Some(text) = self.parse_text() {
                children.push(text);
            }
        }
        children
    }

    /// Skips a comment verbatim, to `-->` or to end of input.
    fn skip_comment(&mut self) {
        self.pos += 4;
        while !self.eof() && !self.lookahead("-->") {
            self.pos += 1;
        }
        if !self.eof() {
            self.pos += 3;
        }
    }

    /// Collects literal text up to the next `<`.
    ///
    /// Pure newline/tab runs are dropped; runs with non-whitespace or at
    /// least one literal space are kept, so meaningful inter-element spacing
    /// survives while indentation does not.
    fn parse_text(&mut self) -> Option<Node> {
        let start = self.pos;
        while !self.eof() && self.peek() != Some('<') {
            self.pos += 1;
        }
        let run: String = self.chars[start..self.pos].iter().collect();
        if run.chars().any(|c| !c.is_whitespace()) || run.contains(' ') {
            Some(Node::Text(run))
        } else {
            None
        }
    }

    fn parse_element(&mut self) -> Node {
        self.pos += 1; // consume '<'
        let tag = self.read_tag_name();
        let mut attrs = HashMap::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.pos += 1;
                    break;
                }
                Some('/') => {
                    self.pos += 1;
                    self_closing = true;
                    if self.peek() == Some('>') {
                        self.pos += 1;
                    }
                    break;
                }
                Some(c) if is_attr_name_char(c) => {
                    let name = self.read_attr_name();
                    let mut value = String::new();
                    // Only `name="value"` is recognized; anything else leaves
                    // the attribute bare and falls through to the one-char
                    // advance below on the next iteration.
                    if self.peek() == Some('=') && self.chars.get(self.pos + 1) == Some(&'"') {
                        self.pos += 2;
                        let start = self.pos;
                        while !self.eof() && self.peek() != Some('"') {
                            self.pos += 1;
                        }
                        value = self.chars[start..self.pos].iter().collect();
                        if !self.eof() {
                            self.pos += 1;
                        }
                    }
                    attrs.insert(name, value);
                }
                Some(_) => {
                    // Unsupported attribute syntax: advance one character at
                    // a time until '>' or '/' comes around.
                    self.pos += 1;
                }
            }
        }

        if self_closing || VOID_TAGS.contains(&tag.as_str()) {
            return Node::Element {
                tag,
                attrs,
                children: Vec::new(),
            };
        }

        let children = self.parse_children();
        self.skip_closing_tag(&tag);
        Node::Element {
            tag,
            attrs,
            children,
        }
    }

    /// Reads the alphanumeric tag name run, lowercased.
    fn read_tag_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .to_lowercase()
    }

    fn read_attr_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_attr_name_char(c) {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Searches case-insensitively for the matching closing tag and jumps
    /// past it. Not a stack-based match: a same-named closing tag from a
    /// different nesting level is accepted. When no closing tag exists the
    /// cursor lands on end of input.
    fn skip_closing_tag(&mut self, tag: &str) {
        let needle: Vec<char> = format!("</{}", tag).chars().collect();
        let mut i = self.pos;
        while i + needle.len() <= self.chars.len() {
            let matched = self.chars[i..i + needle.len()]
                .iter()
                .zip(&needle)
                .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()));
            if matched {
                let after = self.chars.get(i + needle.len()).copied();
                if after.is_none() || after == Some('>') || after.is_some_and(|c| c.is_whitespace())
                {
                    let mut j = i + needle.len();
                    while j < self.chars.len() && self.chars[j] != '>' {
                        j += 1;
                    }
                    self.pos = if j < self.chars.len() {
                        j + 1
                    } else {
                        self.chars.len()
                    };
                    return;
                }
            }
            i += 1;
        }
        self.pos = self.chars.len();
    }
}

fn is_attr_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || c == ':'
}
