use std::collections::VecDeque;
use std::sync::Mutex;

use proxyprobe_core::TaskDescriptor;

/// FIFO queue of descriptors shared by all workers of a run.
pub struct Backlog {
    queue: Mutex<VecDeque<TaskDescriptor>>,
}

impl Backlog {
    pub fn new(descriptors: Vec<TaskDescriptor>) -> Self {
        Self {
            queue: Mutex::new(descriptors.into()),
        }
    }

    pub fn pop_next(&self) -> Option<TaskDescriptor> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<TaskDescriptor>> {
        // The queue holds plain data; a panic elsewhere cannot leave it torn.
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }
}
