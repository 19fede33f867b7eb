use std::collections::VecDeque;

/// Handle for one requested refresh callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequestId(pub u64);

/// Host primitive that delivers "next display refresh" callbacks.
///
/// A request is delivered at most once. After `cancel_frame` the host should not deliver it;
/// the controller still ignores a late delivery.
pub trait FrameScheduler {
    /// Ask for one callback at the next refresh.
    fn request_frame(&mut self) -> FrameRequestId;
    /// Withdraw an outstanding request. Unknown or already-delivered ids are ignored.
    fn cancel_frame(&mut self, id: FrameRequestId);
}

/// In-process scheduler keeping outstanding requests in request order.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: VecDeque<FrameRequestId>,
}

impl FrameQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of outstanding requests.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Return `true` when nothing is waiting for a refresh.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Take every request that is due at this refresh, oldest first.
    pub fn take_due(&mut self) -> Vec<FrameRequestId> {
        self.pending.drain(..).collect()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameRequestId {
        self.next_id += 1;
        let id = FrameRequestId(self.next_id);
        self.pending.push_back(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        self.pending.retain(|&p| p != id);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/scheduler.rs"]
mod tests;
