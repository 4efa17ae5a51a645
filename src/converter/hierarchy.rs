use std::collections::HashSet;

use log::trace;
use serde::Deserialize;

use super::sanitize::sanitize_name;

/// One record of the exported table of contents, in depth-first pre-order.
#[derive(Debug, Clone, Deserialize)]
pub struct TocEntry {
    #[serde(rename = "type")]
    pub kind: TocEntryKind,
    /// Archive-relative stem of the document payload; absent for titles
    #[serde(default)]
    pub url: Option<String>,
    /// Nesting depth relative to an implicit root at depth 0
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TocEntryKind {
    #[serde(rename = "doc", alias = "DOC")]
    Doc,
    #[serde(rename = "title", alias = "TITLE")]
    Title,
}

/// Directory path and file name assigned to one DOC entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedPath {
    /// Sanitized ancestor names joined with `/`; empty at the archive root
    pub dir: String,
    /// Sanitized, collision-resolved base name with a `.md` suffix
    pub file_name: String,
}

impl AssignedPath {
    /// Full archive-relative path of the document file.
    pub fn document_path(&self) -> String {
        if self.dir.is_empty() {
            self.file_name.clone()
        } else {
            format!("{}/{}", self.dir, self.file_name)
        }
    }
}

/// Reconstructs the nested directory layout from the flat, depth-annotated
/// TOC sequence.
///
/// The state is a stack of path segments: a level increase pushes the
/// previous entry's name as a new segment, a decrease pops one segment per
/// level. The used-name set is global, not per-directory, so same-named
/// entries in unrelated subtrees still get distinct names.
pub struct PathAssigner {
    dirs: Vec<String>,
    used_names: HashSet<String>,
    last_name: String,
    last_level: u32,
}

impl PathAssigner {
    pub fn new() -> Self {
        PathAssigner {
            dirs: Vec::new(),
            used_names: HashSet::new(),
            last_name: String::new(),
            last_level: 0,
        }
    }

    /// Folds one entry into the assigner state.
    ///
    /// Returns the assigned output location for DOC entries; TITLE entries
    /// and entries with an empty title yield `None`. Empty titles are
    /// skipped entirely and do not touch the state.
    pub fn assign(&mut self, entry: &TocEntry) -> Option<AssignedPath> {
        if entry.title.is_empty() {
            return None;
        }

        let name = self.claim_name(&entry.title);

        if entry.level > self.last_level {
            // The prior sibling/ancestor becomes a new path segment. A jump
            // of more than one level still pushes only that one segment.
            self.dirs.push(self.last_name.clone());
        } else if entry.level < self.last_level {
            let depth = (self.last_level - entry.level) as usize;
            // Clamp so a deep decrease never underflows the stack.
            let keep = self.dirs.len().saturating_sub(depth);
            self.dirs.truncate(keep);
        }

        let assigned = if entry.kind == TocEntryKind::Doc {
            let path = AssignedPath {
                dir: self.dirs.join("/"),
                file_name: format!("{}.md", name),
            };
            trace!("Assigned {} -> {}", entry.title, path.document_path());
            Some(path)
        } else {
            None
        };

        self.last_name = name;
        self.last_level = entry.level;
        assigned
    }

    /// Sanitizes a title and resolves collisions against the global
    /// used-name set with an incrementing numeric suffix.
    fn claim_name(&mut self, title: &str) -> String {
        let mut name = sanitize_name(title);
        let mut suffix = 1u32;
        while self.used_names.contains(&name) {
            name = format!("{}{}", sanitize_name(title), suffix);
            suffix += 1;
        }
        self.used_names.insert(name.clone());
        name
    }
}

impl Default for PathAssigner {
    fn default() -> Self {
        Self::new()
    }
}
