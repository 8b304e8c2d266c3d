// File: crates/pullscope-query/src/mount.rs
// Summary: One chart view's lifetime: attach on mount, apply loads for its key, detach on unmount.
// Notes:
// - Outcomes for any key other than the current one are ignored, even if not stale.
// - Each mount loads through its own generation counter, so unmounting or re-querying
//   one view never invalidates another view's loads.
// - Unmount (or drop) cancels in-flight loads before releasing the surface.

use pullscope_core::{
    ChartRenderer, ChartResult, PointTimeseries, QueryKey, RenderHandle, RenderSurface, ViewState,
};
use tracing::{debug, warn};

use crate::loader::{LoadOutcome, QueryLoader};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MountStatus {
    Loading,
    Ready,
    /// Showing an empty chart; the message is for the host's status line.
    Unavailable(String),
}

pub struct ChartMount<S: RenderSurface> {
    key: QueryKey,
    loader: QueryLoader,
    handle: Option<RenderHandle<S>>,
    status: MountStatus,
}

impl<S: RenderSurface> ChartMount<S> {
    /// Attach `surface` with an empty chart; data arrives through `refresh` or `apply`.
    /// `loader` may be shared between views; the mount takes a view-scoped copy.
    pub fn mount(renderer: &ChartRenderer, surface: S, key: QueryKey, loader: &QueryLoader) -> ChartResult<Self> {
        let handle = renderer.attach(surface, PointTimeseries::empty())?;
        debug!(%key, "chart mounted");
        Ok(Self { key, loader: loader.for_view(), handle: Some(handle), status: MountStatus::Loading })
    }

    /// This view's loader; tickets it issues are cancelled by `navigate` and `unmount`.
    pub fn loader(&self) -> &QueryLoader {
        &self.loader
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn status(&self) -> &MountStatus {
        &self.status
    }

    pub fn handle(&self) -> Option<&RenderHandle<S>> {
        self.handle.as_ref()
    }

    pub fn handle_mut(&mut self) -> Option<&mut RenderHandle<S>> {
        self.handle.as_mut()
    }

    pub fn show_reset(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| h.show_reset())
    }

    pub fn view_state(&self) -> ViewState {
        self.handle.as_ref().map(|h| h.view_state()).unwrap_or_default()
    }

    /// Load the current key and apply the result.
    pub async fn refresh(&mut self) -> ChartResult<&MountStatus> {
        self.status = MountStatus::Loading;
        let outcome = self.loader.load(self.key.clone()).await;
        self.apply(outcome)?;
        Ok(&self.status)
    }

    /// Switch to another query key. In-flight loads for the old key are cancelled and
    /// the chart is cleared and unzoomed until the next load lands.
    pub fn navigate(&mut self, key: QueryKey) -> ChartResult<()> {
        if key == self.key {
            return Ok(());
        }
        self.loader.cancel();
        debug!(from = %self.key, to = %key, "query key changed");
        self.key = key;
        self.status = MountStatus::Loading;
        if let Some(handle) = self.handle.as_mut() {
            handle.update(PointTimeseries::empty())?;
            handle.reset_zoom()?;
        }
        Ok(())
    }

    /// Apply a load result. Returns whether it changed the chart.
    pub fn apply(&mut self, outcome: LoadOutcome) -> ChartResult<bool> {
        if outcome.is_stale() {
            return Ok(false);
        }
        if outcome.key() != &self.key {
            debug!(current = %self.key, got = %outcome.key(), "ignoring result for another query key");
            return Ok(false);
        }
        let Some(handle) = self.handle.as_mut() else { return Ok(false) };
        match outcome {
            LoadOutcome::Loaded { timeseries, report, .. } => {
                if report.malformed > 0 {
                    warn!(key = %self.key, dropped = report.malformed, "chart data had malformed samples");
                }
                handle.update(timeseries)?;
                self.status = MountStatus::Ready;
            }
            LoadOutcome::Unavailable { error, .. } => {
                handle.update(PointTimeseries::empty())?;
                self.status = MountStatus::Unavailable(error.to_string());
            }
            LoadOutcome::Stale { .. } => return Ok(false),
        }
        Ok(true)
    }

    /// Cancel loads and release the surface.
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.loader.cancel();
            handle.detach();
            debug!(key = %self.key, "chart unmounted");
        }
    }
}

impl<S: RenderSurface> Drop for ChartMount<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
