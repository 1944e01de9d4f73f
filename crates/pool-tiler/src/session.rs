//! Preview/commit holder for live drag editing.
//!
//! While a vertex is being dragged the caller recomputes a layout on every
//! pointer move. The session keeps that transient result apart from the
//! committed one and skips recomputation when the memo key has not changed.
//!
//! # Example
//! ```
//! use pool_tiler::session::LayoutSession;
//!
//! let mut session = LayoutSession::new(0);
//! session.preview_with("a", || 1);
//! session.preview_with("a", || unreachable!());
//! assert_eq!(*session.current(), 1);
//! session.commit();
//! assert_eq!(*session.committed(), 1);
//! ```

/// A committed value plus an optional keyed preview.
#[derive(Debug, Clone, Default)]
pub struct LayoutSession<T> {
    committed: T,
    preview: Option<(String, T)>,
}

impl<T> LayoutSession<T> {
    pub fn new(committed: T) -> Self {
        Self {
            committed,
            preview: None,
        }
    }

    /// The preview while one exists, else the committed value.
    pub fn current(&self) -> &T {
        self.preview.as_ref().map_or(&self.committed, |(_, value)| value)
    }

    pub fn committed(&self) -> &T {
        &self.committed
    }

    pub fn is_previewing(&self) -> bool {
        self.preview.is_some()
    }

    pub fn preview_key(&self) -> Option<&str> {
        self.preview.as_ref().map(|(key, _)| key.as_str())
    }

    /// Show the result of `compute` as the preview for `key`.
    ///
    /// `compute` only runs when `key` differs from the current preview's key.
    pub fn preview_with<F>(&mut self, key: impl Into<String>, compute: F) -> &T
    where
        F: FnOnce() -> T,
    {
        let key = key.into();
        let stale = self.preview_key() != Some(key.as_str());
        if stale {
            self.preview = Some((key, compute()));
        }
        self.current()
    }

    /// Promote the preview to committed. Returns false when there was none.
    pub fn commit(&mut self) -> bool {
        match self.preview.take() {
            Some((_, value)) => {
                self.committed = value;
                true
            }
            None => false,
        }
    }

    pub fn discard_preview(&mut self) {
        self.preview = None;
    }

    /// Replace the committed value outright, dropping any preview.
    pub fn reset(&mut self, committed: T) {
        self.committed = committed;
        self.preview = None;
    }
}
