//! The active view.
//!
//! Only one view is shown at a time. [ViewController] remembers which one, so that re-selecting
//! the current view is a no-op and new filters are applied to it.

use crate::error::DashboardError;
use crate::models::FilterMap;
use crate::source::RecordSource;
use crate::view::{render_view, RenderOutcome, ViewKind};

use tokio::sync::Mutex;

/// Outcome of loading a view
#[derive(Debug, PartialEq)]
pub enum LoadOutcome {
    /// The view was already active and was not re-rendered
    Unchanged,
    /// The view was rendered
    Rendered(RenderOutcome),
}

/// Tracks the active view.
#[derive(Debug, Default)]
pub struct ViewController {
    active: Mutex<Option<ViewKind>>,
}

impl ViewController {
    /// Return a ViewController with no active view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active view, if any.
    pub async fn active(&self) -> Option<ViewKind> {
        *self.active.lock().await
    }

    /// Make `view` the active view and render it.
    ///
    /// Unless `force` is set, nothing is rendered if `view` is already active.
    ///
    /// # Arguments
    ///
    /// * `source`: Source of records
    /// * `view`: View to show
    /// * `filters`: Filters selected by the user
    /// * `force`: Render even if `view` is already active
    pub async fn load(
        &self,
        source: &dyn RecordSource,
        view: ViewKind,
        filters: &FilterMap,
        force: bool,
    ) -> LoadOutcome {
        {
            let mut active = self.active.lock().await;
            if !force && *active == Some(view) {
                tracing::debug!("View {} already active", view);
                return LoadOutcome::Unchanged;
            }
            *active = Some(view);
        }
        LoadOutcome::Rendered(render_view(view, source, filters).await)
    }

    /// Render the active view with new filters.
    ///
    /// # Arguments
    ///
    /// * `source`: Source of records
    /// * `filters`: Filters selected by the user
    pub async fn apply(
        &self,
        source: &dyn RecordSource,
        filters: &FilterMap,
    ) -> Result<RenderOutcome, DashboardError> {
        let view = self.active().await.ok_or(DashboardError::NoActiveView)?;
        Ok(render_view(view, source, filters).await)
    }
}
