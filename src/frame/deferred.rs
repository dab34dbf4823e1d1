//! Work the frame postpones to a safe point, and the events it emits.
//!
//! Tearing down the feature map from inside the handler that asked for it
//! would destroy the overlay while it is still on the call stack, so the
//! request is queued and executed by `ViewFrame::process_deferred`.
//! Requests coalesce: at most one close is pending, and it recreates the
//! map if any of the merged requests asked for that.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Notification queued for the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameEvent {
    /// A different surface or location became current
    ViewChanged { view_type: String, offset: u64 },
    /// The feature map was torn down, and rebuilt if `recreated`
    FeatureMapClosed { recreated: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    CloseFeatureMap { recreate: bool },
}

#[derive(Debug, Default)]
pub struct DeferredQueue {
    tasks: VecDeque<DeferredTask>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: DeferredTask) {
        let DeferredTask::CloseFeatureMap { recreate } = task;
        let pending = self
            .tasks
            .iter_mut()
            .find(|t| matches!(t, DeferredTask::CloseFeatureMap { .. }));
        match pending {
            Some(DeferredTask::CloseFeatureMap { recreate: r }) => *r |= recreate,
            None => self.tasks.push_back(task),
        }
    }

    /// Remove and return every pending task in scheduling order.
    pub fn drain(&mut self) -> Vec<DeferredTask> {
        self.tasks.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}
