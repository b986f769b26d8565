//! Application state for the web layer.

use std::sync::Arc;

use crate::timetable::TimetableService;

/// Shared application state.
pub struct AppState<S, M> {
    /// Timetable engine; also owns the store used by the listing endpoints
    pub timetable: Arc<TimetableService<S, M>>,
}

impl<S, M> AppState<S, M> {
    pub fn new(timetable: TimetableService<S, M>) -> Self {
        Self {
            timetable: Arc::new(timetable),
        }
    }
}

// Manual impl: S and M need not be Clone.
impl<S, M> Clone for AppState<S, M> {
    fn clone(&self) -> Self {
        Self {
            timetable: Arc::clone(&self.timetable),
        }
    }
}
