use std::collections::VecDeque;

use image::DynamicImage;

pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Undo,
    Redo,
}

impl HistoryDirection {
    pub const fn applied_message(self) -> &'static str {
        match self {
            Self::Undo => "undo applied",
            Self::Redo => "redo applied",
        }
    }

    pub const fn empty_message(self) -> &'static str {
        match self {
            Self::Undo => "undo stack empty",
            Self::Redo => "redo stack empty",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditHistory {
    undo_stack: VecDeque<DynamicImage>,
    redo_stack: VecDeque<DynamicImage>,
    capacity: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo_stack: VecDeque::with_capacity(capacity),
            redo_stack: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stores the image as it was before an edit. Any redo branch is discarded.
    pub fn record_edit(&mut self, snapshot: DynamicImage) {
        push_bounded(&mut self.undo_stack, snapshot, self.capacity);
        self.redo_stack.clear();
    }

    pub fn undo(&mut self, current: DynamicImage) -> Option<DynamicImage> {
        self.step(HistoryDirection::Undo, current)
    }

    pub fn redo(&mut self, current: DynamicImage) -> Option<DynamicImage> {
        self.step(HistoryDirection::Redo, current)
    }

    /// Pops from the source stack and pushes `current` onto the opposite one.
    /// Returns `None` without touching either stack when the source is empty.
    pub fn step(
        &mut self,
        direction: HistoryDirection,
        current: DynamicImage,
    ) -> Option<DynamicImage> {
        let capacity = self.capacity;
        let (source, target) = match direction {
            HistoryDirection::Undo => (&mut self.undo_stack, &mut self.redo_stack),
            HistoryDirection::Redo => (&mut self.redo_stack, &mut self.undo_stack),
        };
        let snapshot = source.pop_back()?;
        push_bounded(target, current, capacity);
        Some(snapshot)
    }

    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
}

fn push_bounded(stack: &mut VecDeque<DynamicImage>, image: DynamicImage, capacity: usize) {
    while stack.len() >= capacity {
        stack.pop_front();
    }
    stack.push_back(image);
}
