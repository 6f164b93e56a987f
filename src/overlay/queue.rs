use crate::calc::DisplayResult;
use crate::overlay::labels::Position;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const DEFAULT_LABEL_STAGGER: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq)]
pub struct PendingLabel {
    pub result: DisplayResult,
    pub anchor: Position,
    pub due: Instant,
}

/// FIFO of labels waiting to appear, one stagger step apart.
///
/// Time is always supplied by the caller, so release order can be checked
/// without sleeping.
#[derive(Debug, Clone)]
pub struct LabelQueue {
    pending: VecDeque<PendingLabel>,
    stagger: Duration,
}

impl Default for LabelQueue {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_STAGGER)
    }
}

impl LabelQueue {
    pub fn new(stagger: Duration) -> Self {
        Self {
            pending: VecDeque::new(),
            stagger,
        }
    }

    /// Queue a batch behind anything still pending. Entry `i` of the batch is
    /// due `(i + 1)` stagger steps after the later of `now` and the current tail.
    pub fn push_batch<I>(&mut self, results: I, anchor: Position, now: Instant) -> usize
    where
        I: IntoIterator<Item = DisplayResult>,
    {
        let base = self
            .pending
            .back()
            .map(|tail| tail.due.max(now))
            .unwrap_or(now);
        let mut queued = 0;
        for (idx, result) in results.into_iter().enumerate() {
            let due = base + self.stagger * (idx as u32 + 1);
            self.pending.push_back(PendingLabel {
                result,
                anchor,
                due,
            });
            queued += 1;
        }
        queued
    }

    pub fn pop_due(&mut self, now: Instant) -> Option<PendingLabel> {
        if self.pending.front()?.due <= now {
            self.pending.pop_front()
        } else {
            None
        }
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.front().map(|p| p.due)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(expression: &str) -> DisplayResult {
        DisplayResult {
            expression: expression.into(),
            answer: "0".into(),
        }
    }

    #[test]
    fn entries_become_due_one_step_apart() {
        let mut queue = LabelQueue::new(Duration::from_millis(100));
        let t0 = Instant::now();
        queue.push_batch(
            vec![result("a"), result("b"), result("c")],
            Position::default(),
            t0,
        );

        assert_eq!(queue.pop_due(t0), None);
        assert_eq!(queue.next_due(), Some(t0 + Duration::from_millis(100)));

        let first = queue.pop_due(t0 + Duration::from_millis(100)).expect("a due");
        assert_eq!(first.result.expression, "a");
        assert_eq!(queue.pop_due(t0 + Duration::from_millis(150)), None);

        let rest: Vec<_> = std::iter::from_fn(|| queue.pop_due(t0 + Duration::from_secs(1)))
            .map(|p| p.result.expression)
            .collect();
        assert_eq!(rest, vec!["b", "c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn second_batch_waits_behind_first() {
        let mut queue = LabelQueue::new(Duration::from_millis(100));
        let t0 = Instant::now();
        queue.push_batch(vec![result("a"), result("b")], Position::default(), t0);
        queue.push_batch(
            vec![result("c")],
            Position::default(),
            t0 + Duration::from_millis(10),
        );

        let order: Vec<_> = std::iter::from_fn(|| queue.pop_due(t0 + Duration::from_secs(1)))
            .map(|p| (p.result.expression, p.due - t0))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a".to_string(), Duration::from_millis(100)),
                ("b".to_string(), Duration::from_millis(200)),
                ("c".to_string(), Duration::from_millis(300)),
            ]
        );
    }

    #[test]
    fn batch_captures_anchor_at_scheduling_time() {
        let mut queue = LabelQueue::default();
        let t0 = Instant::now();
        queue.push_batch(vec![result("a")], Position::new(1.0, 2.0), t0);
        queue.push_batch(vec![result("b")], Position::new(9.0, 9.0), t0);

        let later = t0 + Duration::from_secs(5);
        assert_eq!(queue.pop_due(later).map(|p| p.anchor), Some(Position::new(1.0, 2.0)));
        assert_eq!(queue.pop_due(later).map(|p| p.anchor), Some(Position::new(9.0, 9.0)));
    }
}
