//! Deletion scope of a target's output directory
//!
//! A scope is an ordered list of glob patterns: positive patterns select what
//! the clean stage may remove, `!`-prefixed ones protect paths (and
//! everything beneath them) from removal.

use glob::Pattern;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionScope {
    root: PathBuf,
    patterns: Vec<String>,
}

impl DeletionScope {
    /// Everything under `root` except `root` itself and its `.git` directory
    pub fn for_output(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let base = root.to_string_lossy().into_owned();
        let patterns = vec![
            format!("{}/**", base),
            format!("!{}", base),
            format!("!{}/.git", base),
        ];
        Self { root, patterns }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// True when the clean stage may delete `path`
    pub fn allows(&self, path: &Path) -> bool {
        if !path.starts_with(&self.root) || self.is_protected(path) {
            return false;
        }

        let candidate = path.to_string_lossy();
        self.positive()
            .any(|pattern| pattern.matches(&candidate))
    }

    /// True when `path` or one of its ancestors is excluded by a negation
    pub fn is_protected(&self, path: &Path) -> bool {
        let negations: Vec<Pattern> = self.negative().collect();
        if negations.is_empty() {
            return false;
        }

        let mut current = Some(path);
        while let Some(p) = current {
            let candidate = p.to_string_lossy();
            if negations.iter().any(|n| n.matches(&candidate)) {
                // The root itself is kept, but not its whole subtree
                if p != path && p == self.root {
                    return false;
                }
                return true;
            }
            if p == self.root {
                break;
            }
            current = p.parent();
        }
        false
    }

    fn positive(&self) -> impl Iterator<Item = Pattern> + '_ {
        self.patterns
            .iter()
            .filter(|p| !p.starts_with('!'))
            .filter_map(|p| compile(p))
    }

    fn negative(&self) -> impl Iterator<Item = Pattern> + '_ {
        self.patterns
            .iter()
            .filter_map(|p| p.strip_prefix('!'))
            .filter_map(compile)
    }
}

/// Compile a scope pattern, escaping glob metacharacters in the path prefix
fn compile(pattern: &str) -> Option<Pattern> {
    let (literal, glob) = match pattern.find("/**") {
        Some(index) => pattern.split_at(index),
        None => (pattern, ""),
    };
    Pattern::new(&format!("{}{}", Pattern::escape(literal), glob)).ok()
}

impl Serialize for DeletionScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.patterns.len()))?;
        for pattern in &self.patterns {
            seq.serialize_element(pattern)?;
        }
        seq.end()
    }
}
