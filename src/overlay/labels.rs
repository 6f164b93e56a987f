use crate::calc::DisplayResult;
use crate::draw::InkBounds;
use crate::error::{CanvasError, Result};
use crate::overlay::queue::{LabelQueue, DEFAULT_LABEL_STAGGER};
use crate::overlay::typeset::RenderedMath;
use std::time::{Duration, Instant};

/// Where labels go when nothing has been placed yet.
pub const DEFAULT_ANCHOR: Position = Position::new(10.0, 200.0);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(u64);

impl LabelId {
    pub fn value(self) -> u64 {
        self.0
    }
}

pub fn latex_label(expression: &str, answer: &str) -> String {
    format!(r"\(\LARGE({expression} = {answer})\)")
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLabel {
    id: LabelId,
    text: String,
    pub position: Position,
    rendered: Option<RenderedMath>,
    needs_typeset: bool,
}

impl OverlayLabel {
    pub fn id(&self) -> LabelId {
        self.id
    }

    /// LaTeX source, always `\(\LARGE(expr = answer)\)`.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn rendered(&self) -> Option<&RenderedMath> {
        self.rendered.as_ref()
    }

    pub fn needs_typeset(&self) -> bool {
        self.needs_typeset
    }

    pub fn set_rendered(&mut self, rendered: Option<RenderedMath>) {
        self.rendered = rendered;
        self.needs_typeset = false;
    }
}

/// Draggable answer labels laid over the canvas.
///
/// Every label owns its position: it starts at the anchor that was current
/// when its batch was scheduled and afterwards moves only when that label is
/// dragged.
#[derive(Debug, Clone)]
pub struct OverlayManager {
    labels: Vec<OverlayLabel>,
    anchor: Option<Position>,
    queue: LabelQueue,
    next_id: u64,
}

impl Default for OverlayManager {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_STAGGER)
    }
}

impl OverlayManager {
    pub fn new(stagger: Duration) -> Self {
        Self {
            labels: Vec::new(),
            anchor: None,
            queue: LabelQueue::new(stagger),
            next_id: 0,
        }
    }

    pub fn labels(&self) -> &[OverlayLabel] {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut [OverlayLabel] {
        &mut self.labels
    }

    pub fn label(&self, id: LabelId) -> Option<&OverlayLabel> {
        self.labels.iter().find(|l| l.id == id)
    }

    pub fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    pub fn queue(&self) -> &LabelQueue {
        &self.queue
    }

    pub fn place_from_bounding_box(&mut self, bounds: &InkBounds) -> Result<Position> {
        let (x, y) = bounds.center().ok_or(CanvasError::DegenerateInk)?;
        let anchor = Position::new(x, y);
        self.anchor = Some(anchor);
        Ok(anchor)
    }

    /// Append a label at the current anchor. Earlier labels stay.
    pub fn add_label(&mut self, expression: &str, answer: &str) -> LabelId {
        let position = self.anchor.unwrap_or(DEFAULT_ANCHOR);
        self.push_label(expression, answer, position)
    }

    /// Queue a batch for staggered insertion at the current anchor.
    pub fn schedule<I>(&mut self, results: I, now: Instant) -> usize
    where
        I: IntoIterator<Item = DisplayResult>,
    {
        let anchor = self.anchor.unwrap_or(DEFAULT_ANCHOR);
        self.queue.push_batch(results, anchor, now)
    }

    /// Move every due entry from the queue into the label list, in order.
    pub fn release_due(&mut self, now: Instant) -> Vec<LabelId> {
        let mut released = Vec::new();
        while let Some(pending) = self.queue.pop_due(now) {
            let id = self.push_label(
                &pending.result.expression,
                &pending.result.answer,
                pending.anchor,
            );
            released.push(id);
        }
        released
    }

    pub fn move_label(&mut self, id: LabelId, position: Position) -> bool {
        match self.labels.iter_mut().find(|l| l.id == id) {
            Some(label) => {
                label.position = position;
                true
            }
            None => false,
        }
    }

    pub fn drag_label(&mut self, id: LabelId, dx: f32, dy: f32) -> bool {
        let Some(current) = self.label(id).map(|l| l.position) else {
            return false;
        };
        self.move_label(id, Position::new(current.x + dx, current.y + dy))
    }

    pub fn clear(&mut self) {
        self.labels.clear();
        self.queue.clear();
        self.anchor = None;
    }

    fn push_label(&mut self, expression: &str, answer: &str, position: Position) -> LabelId {
        let id = LabelId(self.next_id);
        self.next_id += 1;
        self.labels.push(OverlayLabel {
            id,
            text: latex_label(expression, answer),
            position,
            rendered: None,
            needs_typeset: true,
        });
        id
    }
}
