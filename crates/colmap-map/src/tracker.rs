//! Dirty state tracking for the mapping document.

/// Tracks unsaved changes in a mapping document.
///
/// Drives the "unsaved changes" indicator and save prompts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirtyTracker {
    dirty: bool,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clears the dirty flag after a successful save.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_dirty_then_saved() {
        let mut tracker = DirtyTracker::new();
        assert!(!tracker.is_dirty());
        tracker.mark_dirty();
        tracker.mark_dirty();
        assert!(tracker.is_dirty());

        tracker.mark_saved();
        assert!(!tracker.is_dirty());
    }
}
