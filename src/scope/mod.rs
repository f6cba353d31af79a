//! Verilog block tracking.
//!
//! The indenter keeps a [`FrameStack`] of open blocks. Each [`Frame`] records
//! the header indentation (reused for the closer and for a chained `else`) and
//! the indentation of the block body:
//! - Conditional branches, loops and procedural blocks
//! - Case statements and their items
//! - Generate regions and free-standing `begin`/`fork` scopes

pub mod types;

pub use types::{BlockKind, Frame, Indent};

/// Stack of open blocks, innermost last
#[derive(Debug, Default)]
pub struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    #[must_use]
    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Indentation for a line directly inside the innermost block
    #[must_use]
    pub fn body_indent(&self) -> Option<Indent> {
        self.top().map(|f| f.body)
    }

    /// Whether a frame of `kind` is open anywhere on the stack
    #[must_use]
    pub fn contains(&self, kind: BlockKind) -> bool {
        self.frames.iter().any(|f| f.kind == kind)
    }

    /// Pop frames down to and including the innermost frame of `kind`
    ///
    /// Leaves the stack untouched and returns `None` when no such frame is open.
    pub fn pop_to(&mut self, kind: BlockKind) -> Option<Frame> {
        let idx = self.frames.iter().rposition(|f| f.kind == kind)?;
        let frame = self.frames[idx];
        self.frames.truncate(idx);
        Some(frame)
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
