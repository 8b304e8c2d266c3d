// File: crates/pullscope-query/tests/mount.rs
// Purpose: Mount-scoped chart lifecycle: load application, key checks, unmount release.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use pullscope_core::{
    register_once, ChartOptions, ChartRenderer, ChartResult, QueryKey, RenderSurface, Scene, Viewport, ZoomState,
};
use pullscope_query::{ChartMount, FixtureSource, LoadOutcome, LoadSettings, MountStatus, QueryLoader, DAMAGE};

struct CountingSurface {
    last: Option<Scene>,
    released: Rc<Cell<usize>>,
}

impl RenderSurface for CountingSurface {
    fn size(&self) -> Option<(u32, u32)> {
        Some((900, 300))
    }

    fn present(&mut self, scene: &Scene) -> ChartResult<()> {
        self.last = Some(scene.clone());
        Ok(())
    }

    fn release(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

fn key(pull: &str) -> QueryKey {
    QueryKey::new("3", DAMAGE, pull)
}

fn mount_with(shared: &QueryLoader, pull: &str) -> (ChartMount<CountingSurface>, QueryLoader, Rc<Cell<usize>>) {
    register_once();
    let renderer = ChartRenderer::new(ChartOptions::default()).expect("renderer");
    let released = Rc::new(Cell::new(0));
    let surface = CountingSurface { last: None, released: released.clone() };
    let m = ChartMount::mount(&renderer, surface, key(pull), shared).expect("mount");
    let loader = m.loader().clone();
    (m, loader, released)
}

fn mount(pull: &str) -> (ChartMount<CountingSurface>, QueryLoader, Rc<Cell<usize>>) {
    mount_with(&QueryLoader::new(Arc::new(FixtureSource::new()), LoadSettings::default()), pull)
}

fn series_count(m: &ChartMount<CountingSurface>) -> usize {
    m.handle().and_then(|h| h.surface()).and_then(|s| s.last.as_ref()).map_or(0, |s| s.series.len())
}

#[tokio::test]
async fn refresh_loads_current_key() {
    let (mut m, _, _) = mount("1");
    assert_eq!(m.status(), &MountStatus::Loading);
    assert_eq!(series_count(&m), 0, "empty chart until data lands");

    assert_eq!(m.refresh().await.unwrap(), &MountStatus::Ready);
    assert_eq!(m.handle().unwrap().config().series.len(), 3);
    assert!(series_count(&m) >= 3);
    assert!(!m.show_reset());
}

#[tokio::test]
async fn refresh_keeps_user_zoom() {
    let (mut m, _, _) = mount("1");
    m.refresh().await.unwrap();
    let full = m.handle().unwrap().full_extent();
    let zoomed = Viewport::new(full.x_min + 2.0, full.x_min + 4.0);
    m.handle_mut().unwrap().zoom_to(zoomed.x_min, zoomed.x_max).unwrap();
    assert!(m.show_reset());

    m.refresh().await.unwrap();
    assert_eq!(m.handle().unwrap().viewport(), zoomed);
    assert!(m.view_state().zoomed);
}

#[tokio::test]
async fn results_for_other_keys_are_ignored() {
    let (mut m, loader, _) = mount("1");
    let foreign = loader.load(key("2")).await;
    assert!(matches!(foreign, LoadOutcome::Loaded { .. }));
    assert!(!m.apply(foreign).unwrap());
    assert_eq!(m.status(), &MountStatus::Loading);
    assert_eq!(m.handle().unwrap().config().series.len(), 0);
}

#[tokio::test]
async fn navigate_discards_in_flight_load() {
    let (mut m, loader, _) = mount("1");
    let ticket = loader.begin(key("1"));
    m.navigate(key("2")).unwrap();
    let late = loader.run(ticket).await;
    assert!(late.is_stale());
    assert!(!m.apply(late).unwrap());

    assert_eq!(m.refresh().await.unwrap(), &MountStatus::Ready);
    assert_eq!(m.key(), &key("2"));
}

#[tokio::test]
async fn navigate_clears_zoom() {
    let (mut m, _, _) = mount("1");
    m.refresh().await.unwrap();
    m.handle_mut().unwrap().zoom_to(0.0, 1.0).unwrap();
    m.navigate(key("3")).unwrap();
    assert_eq!(m.handle().unwrap().zoom_state(), ZoomState::Default);
    assert_eq!(m.status(), &MountStatus::Loading);
}

#[tokio::test]
async fn unavailable_data_shows_empty_chart() {
    let (mut m, _, _) = mount("99");
    let status = m.refresh().await.unwrap().clone();
    let MountStatus::Unavailable(message) = status else { panic!("expected unavailable") };
    assert!(message.contains("3/99/damage"), "{message}");
    assert_eq!(series_count(&m), 0);
    let scene = m.handle().unwrap().scene().expect("surface attached");
    assert!(!scene.grid.is_empty(), "axes still drawn");
}

#[tokio::test]
async fn unmount_cancels_and_releases_once() {
    let (m, loader, released) = mount("1");
    let ticket = loader.begin(key("1"));
    m.unmount();
    assert_eq!(released.get(), 1);
    assert!(loader.run(ticket).await.is_stale());
}

#[test]
fn drop_releases_once() {
    let (m, _, released) = mount("1");
    drop(m);
    assert_eq!(released.get(), 1);
}

#[tokio::test]
async fn views_sharing_a_loader_do_not_cancel_each_other() {
    let shared = QueryLoader::new(
        Arc::new(FixtureSource::new().with_latency(Duration::from_millis(30))),
        LoadSettings::default(),
    );
    let (mut a, loader_a, _) = mount_with(&shared, "1");
    let (mut b, _, released_b) = mount_with(&shared, "2");

    let (status_a, status_b) = tokio::join!(a.refresh(), b.refresh());
    assert_eq!(status_a.unwrap(), &MountStatus::Ready);
    assert_eq!(status_b.unwrap(), &MountStatus::Ready);

    // Unmounting B while A has a load in flight leaves A's ticket current.
    let ticket = loader_a.begin(key("1"));
    b.unmount();
    assert_eq!(released_b.get(), 1);
    shared.cancel();
    let outcome = loader_a.run(ticket).await;
    assert!(matches!(outcome, LoadOutcome::Loaded { .. }));
    assert!(a.apply(outcome).unwrap());
    assert_eq!(a.status(), &MountStatus::Ready);
}
