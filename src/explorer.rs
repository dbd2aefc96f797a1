//! Explorer session
//!
//! Wraps the layout engine with the state the page keeps around it: a
//! breadcrumb history of visited topics and the set of cards picked for a
//! drill-down.

use thiserror::Error;

use crate::engine::LayoutEngine;
use crate::records::{FlashcardRecord, RecordError};
use crate::renderer::RenderTarget;

/// Most cards that can be combined into one drill-down topic
pub const MAX_SELECTED_CARDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("at most {max} cards can be selected")]
    Full { max: usize },
    #[error("no card with id {0}")]
    UnknownNode(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("history index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
}

/// One visited topic
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub topic: String,
    pub records: Vec<FlashcardRecord>,
}

/// Breadcrumb trail of visited topics
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, topic: impl Into<String>, records: Vec<FlashcardRecord>) {
        self.entries.push(HistoryEntry {
            topic: topic.into(),
            records,
        });
    }

    /// Drop everything after `index` and return the entry now on top
    pub fn navigate_to(&mut self, index: usize) -> Result<&HistoryEntry, HistoryError> {
        let len = self.entries.len();
        if index >= len {
            return Err(HistoryError::OutOfRange { index, len });
        }
        self.entries.truncate(index + 1);
        Ok(&self.entries[index])
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Topics from oldest to newest
    pub fn breadcrumbs(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.topic.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Cards picked for a combined drill-down, in pick order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<usize>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select or deselect `id`. Returns whether it is now selected.
    pub fn toggle(&mut self, id: usize) -> Result<bool, SelectionError> {
        if let Some(pos) = self.ids.iter().position(|&s| s == id) {
            self.ids.remove(pos);
            return Ok(false);
        }
        if self.ids.len() >= MAX_SELECTED_CARDS {
            return Err(SelectionError::Full {
                max: MAX_SELECTED_CARDS,
            });
        }
        self.ids.push(id);
        Ok(true)
    }

    pub fn contains(&self, id: usize) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Selected terms joined into one topic, e.g. `"Cell + Membrane"`
    pub fn combined_topic<'a>(&self, term_of: impl Fn(usize) -> Option<&'a str>) -> Option<String> {
        let terms: Vec<&str> = self.ids.iter().filter_map(|&id| term_of(id)).collect();
        if terms.is_empty() {
            None
        } else {
            Some(terms.join(" + "))
        }
    }
}

/// Layout engine plus history and selection
pub struct ExplorerSession<T: RenderTarget> {
    engine: LayoutEngine<T>,
    history: History,
    selection: Selection,
}

impl<T: RenderTarget> ExplorerSession<T> {
    pub fn new(engine: LayoutEngine<T>) -> Self {
        Self {
            engine,
            history: History::new(),
            selection: Selection::new(),
        }
    }

    pub fn engine(&self) -> &LayoutEngine<T> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut LayoutEngine<T> {
        &mut self.engine
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Show freshly generated cards for `topic`.
    ///
    /// A new search starts a new trail; a drill-down extends it. Empty
    /// results leave the current view untouched.
    pub fn show_topic(
        &mut self,
        topic: &str,
        records: Vec<FlashcardRecord>,
        drill_down: bool,
    ) -> Result<(), RecordError> {
        if records.is_empty() {
            return Err(RecordError::Empty);
        }
        if !drill_down {
            self.history.clear();
        }
        self.selection.clear();
        self.engine.create_nodes(&records);
        self.history.push(topic, records);
        log::info!("Showing '{}' (depth {})", topic, self.history.len());
        Ok(())
    }

    /// Jump back to breadcrumb `index`, rebuilding its nodes
    pub fn navigate_to(&mut self, index: usize) -> Result<(), HistoryError> {
        let entry = self.history.navigate_to(index)?;
        let records = entry.records.clone();
        log::info!("Navigating back to '{}'", entry.topic);
        self.selection.clear();
        self.engine.create_nodes(&records);
        Ok(())
    }

    /// Back to the empty start view
    pub fn reset(&mut self) {
        self.history.clear();
        self.selection.clear();
        self.engine.reset();
    }

    /// Deselect every card
    pub fn clear_selection(&mut self) {
        for &id in self.selection.ids() {
            self.engine.mark_selected(id, false);
        }
        self.selection.clear();
    }

    pub fn toggle_selection(&mut self, id: usize) -> Result<bool, SelectionError> {
        if self.engine.node(id).is_none() {
            return Err(SelectionError::UnknownNode(id));
        }
        let selected = self.selection.toggle(id)?;
        self.engine.mark_selected(id, selected);
        Ok(selected)
    }

    /// Topic for a drill-down from the current selection
    pub fn selection_topic(&self) -> Option<String> {
        self.selection
            .combined_topic(|id| self.engine.node(id).map(|n| n.term.as_str()))
    }
}
