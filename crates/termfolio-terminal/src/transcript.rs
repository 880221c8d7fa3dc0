//! The scrolling transcript shown to the user.
//!
//! Static lines are appended once and never change. A live region belongs to
//! one animation and is repainted in place by id, so animations never
//! disturb lines written before or after them.

use std::cell::RefCell;
use std::rc::Rc;

use termfolio_types::output::OutputLine;

/// One transcript entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Line(OutputLine),
    Region { id: String, lines: Vec<OutputLine> },
}

/// Shared transcript. Clones refer to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Rc<RefCell<Vec<Entry>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, line: OutputLine) {
        self.entries.borrow_mut().push(Entry::Line(line));
    }

    pub fn extend(&self, lines: impl IntoIterator<Item = OutputLine>) {
        self.entries
            .borrow_mut()
            .extend(lines.into_iter().map(Entry::Line));
    }

    /// Append an empty live region for `id`. No-op if it already exists.
    pub fn open_region(&self, id: &str) {
        if !self.has_region(id) {
            self.entries.borrow_mut().push(Entry::Region {
                id: id.to_string(),
                lines: Vec::new(),
            });
        }
    }

    /// Replace the lines of region `id`. Returns false if the region is gone.
    pub fn update_region(&self, id: &str, new_lines: Vec<OutputLine>) -> bool {
        let mut entries = self.entries.borrow_mut();
        let region = entries.iter_mut().find_map(|e| match e {
            Entry::Region { id: rid, lines } if rid == id => Some(lines),
            _ => None,
        });
        match region {
            Some(lines) => {
                *lines = new_lines;
                true
            },
            None => false,
        }
    }

    /// Drop region `id` entirely. Returns whether it existed.
    pub fn remove_region(&self, id: &str) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|e| !matches!(e, Entry::Region { id: rid, .. } if rid == id));
        entries.len() != before
    }

    pub fn has_region(&self, id: &str) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|e| matches!(e, Entry::Region { id: rid, .. } if rid == id))
    }

    /// Current lines of region `id`.
    pub fn region(&self, id: &str) -> Option<Vec<OutputLine>> {
        self.entries.borrow().iter().find_map(|e| match e {
            Entry::Region { id: rid, lines } if rid == id => Some(lines.clone()),
            _ => None,
        })
    }

    /// Snapshot of every entry.
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.borrow().clone()
    }

    /// Flattened snapshot with regions expanded in place.
    pub fn lines(&self) -> Vec<OutputLine> {
        let entries = self.entries.borrow();
        let mut out = Vec::with_capacity(entries.len());
        for entry in entries.iter() {
            match entry {
                Entry::Line(line) => out.push(line.clone()),
                Entry::Region { lines, .. } => out.extend(lines.iter().cloned()),
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Remove all entries, regions included.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(t: &Transcript) -> Vec<String> {
        t.lines().iter().map(OutputLine::plain_text).collect()
    }

    #[test]
    fn region_repaints_in_place() {
        let t = Transcript::new();
        t.push(OutputLine::text("before"));
        t.open_region("spin-1");
        t.push(OutputLine::text("after"));

        assert!(t.update_region("spin-1", vec![OutputLine::text("|")]));
        assert_eq!(texts(&t), vec!["before", "|", "after"]);

        assert!(t.update_region(
            "spin-1",
            vec![OutputLine::text("/"), OutputLine::text("-")]
        ));
        assert_eq!(texts(&t), vec!["before", "/", "-", "after"]);
    }

    #[test]
    fn regions_are_independent() {
        let t = Transcript::new();
        t.open_region("a");
        t.open_region("b");
        t.update_region("b", vec![OutputLine::text("B")]);
        t.update_region("a", vec![OutputLine::text("A1"), OutputLine::text("A2")]);
        t.update_region("b", vec![OutputLine::text("B2")]);
        assert_eq!(texts(&t), vec!["A1", "A2", "B2"]);
    }

    #[test]
    fn update_after_clear_is_ignored() {
        let t = Transcript::new();
        t.open_region("x");
        t.clear();
        assert!(!t.update_region("x", vec![OutputLine::text("late")]));
        assert!(t.is_empty());
    }

    #[test]
    fn open_region_is_idempotent() {
        let t = Transcript::new();
        t.open_region("x");
        t.open_region("x");
        assert_eq!(t.len(), 1);
        assert_eq!(t.region("x"), Some(Vec::new()));
    }

    #[test]
    fn remove_region_keeps_surrounding_lines() {
        let t = Transcript::new();
        t.push(OutputLine::text("before"));
        t.open_region("fx");
        t.update_region("fx", vec![OutputLine::text("frame")]);
        t.push(OutputLine::text("after"));
        assert!(t.remove_region("fx"));
        assert!(!t.remove_region("fx"));
        assert_eq!(texts(&t), vec!["before", "after"]);
    }
}
