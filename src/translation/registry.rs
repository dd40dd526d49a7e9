/*!
 * Original text registry.
 *
 * Remembers the exact pre-translation text of every fragment changed during
 * the current page session so the page can be restored. Lives in memory only.
 */

use log::{debug, warn};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use crate::document::DocumentTree;

/// Outcome of a restore
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Fragments written back
    pub restored: usize,
    /// Fragments that could not be written (no longer attached)
    pub skipped: usize,
}

/// Fragment handle to original text, each handle at most once
#[derive(Debug, Clone)]
pub struct OriginalTextRegistry<N> {
    entries: Vec<(N, String)>,
    recorded: HashSet<N>,
}

impl<N> Default for OriginalTextRegistry<N> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            recorded: HashSet::new(),
        }
    }
}

impl<N: Copy + Eq + Hash + Debug> OriginalTextRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `original` for `node`; returns false if `node` was already recorded
    pub fn record(&mut self, node: N, original: impl Into<String>) -> bool {
        if !self.recorded.insert(node) {
            return false;
        }
        self.entries.push((node, original.into()));
        true
    }

    pub fn contains(&self, node: &N) -> bool {
        self.recorded.contains(node)
    }

    /// Whether any fragment is currently translated
    pub fn is_active(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Original text recorded for `node`
    pub fn original(&self, node: &N) -> Option<&str> {
        self.entries
            .iter()
            .find(|(recorded, _)| recorded == node)
            .map(|(_, text)| text.as_str())
    }

    /// Write every original back, then forget all of them.
    ///
    /// A failed write skips that fragment only. Restoring an empty registry
    /// does nothing.
    pub fn restore<D>(&mut self, doc: &mut D) -> RestoreReport
    where
        D: DocumentTree<NodeId = N>,
    {
        let mut report = RestoreReport::default();

        for (node, original) in self.entries.drain(..) {
            match doc.set_text(node, &original) {
                Ok(()) => report.restored += 1,
                Err(e) => {
                    warn!("Skipping restore of fragment {:?}: {}", node, e);
                    report.skipped += 1;
                }
            }
        }
        self.recorded.clear();

        debug!(
            "Restored {} fragment(s), skipped {}",
            report.restored, report.skipped
        );
        report
    }

    /// Forget every entry without touching the document (page session ended)
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recorded.clear();
    }
}
