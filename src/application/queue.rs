use std::collections::VecDeque;

use crate::domain::DownloadRequest;

/// Pending requests in submission order. The in-flight request is never held here.
#[derive(Debug, Default)]
pub struct DownloadQueue {
    pending: VecDeque<DownloadRequest>,
}

impl DownloadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents, keeping the given order.
    pub fn replace(&mut self, requests: Vec<DownloadRequest>) {
        self.pending = requests.into();
    }

    pub fn pop_next(&mut self) -> Option<DownloadRequest> {
        self.pending.pop_front()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
