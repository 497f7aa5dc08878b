//! Scroll-to-state mapping: page scroll offset -> section progress -> camera
//! target and mountain visibility. Also the virtual page that stands in for a
//! browser scroll container.

use glam::Vec3;

use crate::scene::SceneContext;

/// Number of scroll sections. There is one more waypoint than sections.
pub const SECTION_COUNT: usize = 2;

/// Camera waypoints, one per section boundary.
pub const WAYPOINTS: [Vec3; SECTION_COUNT + 1] = [
    Vec3::new(0.0, 30.0, 300.0),
    Vec3::new(0.0, 40.0, -50.0),
    Vec3::new(0.0, 50.0, -700.0),
];

/// Past this progress the mountains are pushed out of view.
pub const HIDE_THRESHOLD: f32 = 0.7;
/// Depth used to park hidden mountain layers behind the camera.
pub const HIDDEN_DEPTH: f32 = 600_000.0;
/// Pixels scrolled per wheel line.
pub const LINE_HEIGHT: f32 = 100.0;

/// Normalized scroll state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollProgress {
    /// Overall progress in [0, 1].
    pub progress: f32,
    /// Current section in [0, SECTION_COUNT].
    pub section: usize,
    /// Progress within the section in [0, 1).
    pub section_progress: f32,
}

impl ScrollProgress {
    /// Map a scroll offset on a page of `document_height` shown through a
    /// viewport of `viewport_height`. An empty scroll range or a NaN offset
    /// maps to 0; infinite offsets clamp to the ends.
    pub fn from_scroll(scroll_y: f32, document_height: f32, viewport_height: f32) -> Self {
        let range = document_height - viewport_height;
        let progress = if range > 0.0 && !scroll_y.is_nan() {
            (scroll_y / range).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self::from_progress(progress)
    }

    pub fn from_progress(progress: f32) -> Self {
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        let scaled = progress * SECTION_COUNT as f32;
        let section = (scaled.floor() as usize).min(SECTION_COUNT);
        let section_progress = scaled.fract();
        Self {
            progress,
            section,
            section_progress,
        }
    }

    /// Camera target between this section's waypoint and the next. The last
    /// section has no next waypoint and stays on its own.
    pub fn camera_target(&self) -> Vec3 {
        let current = WAYPOINTS[self.section.min(SECTION_COUNT)];
        let next = WAYPOINTS.get(self.section + 1).copied().unwrap_or(current);
        current.lerp(next, self.section_progress)
    }

    pub fn mountains_hidden(&self) -> bool {
        self.progress > HIDE_THRESHOLD
    }
}

/// Apply a scroll state to the scene: new camera target, mountain depths,
/// and the nebula tracking the back-most layer.
pub fn apply<B>(ctx: &mut SceneContext<B>, state: &ScrollProgress) {
    ctx.camera_target = Some(state.camera_target());

    let hidden = state.mountains_hidden();
    for (layer, id) in ctx.mountains.iter().enumerate() {
        let Some(home) = ctx.homes.depth(layer) else {
            continue;
        };
        if let Some(object) = ctx.scene.get_mut(*id) {
            object.transform.position.z = if hidden { HIDDEN_DEPTH } else { home };
        }
    }

    let back_most = procgen::back_most_layer(&procgen::MOUNTAIN_LAYERS)
        .and_then(|layer| ctx.mountains.get(layer))
        .and_then(|id| ctx.scene.get(*id))
        .map(|o| o.transform.position.z);
    if let (Some(z), Some(nebula)) = (back_most, ctx.nebula) {
        if let Some(object) = ctx.scene.get_mut(nebula) {
            object.transform.position.z = z;
        }
    }
}

/// Virtual page: `SECTION_COUNT + 1` viewports tall, scrolled by wheel and keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollContainer {
    offset: f32,
    viewport_height: f32,
}

impl ScrollContainer {
    pub fn new(viewport_height: f32) -> Self {
        Self {
            offset: 0.0,
            viewport_height: viewport_height.max(0.0),
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn document_height(&self) -> f32 {
        self.viewport_height * (SECTION_COUNT + 1) as f32
    }

    pub fn max_scroll(&self) -> f32 {
        (self.document_height() - self.viewport_height).max(0.0)
    }

    /// Scroll by `dy` pixels (positive = down the page).
    pub fn scroll_by(&mut self, dy: f32) {
        self.scroll_to(self.offset + dy);
    }

    pub fn scroll_to(&mut self, offset: f32) {
        self.offset = if offset.is_finite() {
            offset.clamp(0.0, self.max_scroll())
        } else {
            self.offset
        };
    }

    pub fn scroll_lines(&mut self, lines: f32) {
        self.scroll_by(lines * LINE_HEIGHT);
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.viewport_height);
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-self.viewport_height);
    }

    pub fn home(&mut self) {
        self.scroll_to(0.0);
    }

    pub fn end(&mut self) {
        self.scroll_to(self.max_scroll());
    }

    /// Change the viewport height while keeping the relative position on the page.
    pub fn set_viewport_height(&mut self, height: f32) {
        let max = self.max_scroll();
        let relative = if max > 0.0 { self.offset / max } else { 0.0 };
        self.viewport_height = height.max(0.0);
        self.offset = relative * self.max_scroll();
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::testing::populated;

    fn page_progress(page: &ScrollContainer) -> ScrollProgress {
        ScrollProgress::from_scroll(page.offset(), page.document_height(), page.viewport_height())
    }

    #[test]
    fn halfway_lands_exactly_on_middle_waypoint() {
        let p = ScrollProgress::from_scroll(1000.0, 3000.0, 1000.0);
        assert_eq!(p.progress, 0.5);
        assert_eq!(p.section, 1);
        assert_eq!(p.section_progress, 0.0);
        assert_eq!(p.camera_target(), WAYPOINTS[1]);
    }

    #[test]
    fn overscroll_clamps_to_one() {
        let p = ScrollProgress::from_scroll(2100.0, 3000.0, 1000.0);
        assert_eq!(p.progress, 1.0);
        assert_eq!(p.section, SECTION_COUNT);
        assert_eq!(p.camera_target(), WAYPOINTS[SECTION_COUNT]);
    }

    #[test]
    fn empty_range_maps_to_zero() {
        assert_eq!(ScrollProgress::from_scroll(500.0, 1000.0, 1000.0).progress, 0.0);
        assert_eq!(ScrollProgress::from_scroll(500.0, 800.0, 1000.0).progress, 0.0);
        assert_eq!(ScrollProgress::from_scroll(-50.0, 3000.0, 1000.0).progress, 0.0);
    }

    #[test]
    fn infinite_offsets_clamp_and_nan_maps_to_zero() {
        assert_eq!(ScrollProgress::from_scroll(f32::MAX, 3000.0, 1000.0).progress, 1.0);
        assert_eq!(ScrollProgress::from_scroll(f32::INFINITY, 3000.0, 1000.0).progress, 1.0);
        assert_eq!(ScrollProgress::from_scroll(f32::NEG_INFINITY, 3000.0, 1000.0).progress, 0.0);
        assert_eq!(ScrollProgress::from_scroll(f32::NAN, 3000.0, 1000.0).progress, 0.0);
        assert_eq!(ScrollProgress::from_progress(f32::INFINITY).section, SECTION_COUNT);
        assert_eq!(ScrollProgress::from_progress(f32::NAN).progress, 0.0);
    }

    #[test]
    fn progress_is_bounded_and_monotonic() {
        let mut prev = ScrollProgress::default();
        for step in 0..=300 {
            let y = step as f32 * 10.0 - 200.0;
            let p = ScrollProgress::from_scroll(y, 3000.0, 1000.0);
            assert!((0.0..=1.0).contains(&p.progress));
            assert!(p.progress >= prev.progress);
            assert!(p.section <= SECTION_COUNT);
            assert!((0.0..1.0).contains(&p.section_progress));
            prev = p;
        }
    }

    #[test]
    fn interpolation_approaches_next_waypoint() {
        let p = ScrollProgress::from_progress(0.4999);
        assert_eq!(p.section, 0);
        assert!(p.camera_target().distance(WAYPOINTS[1]) < 0.2);

        let start = ScrollProgress::from_progress(0.0);
        assert_eq!(start.camera_target(), WAYPOINTS[0]);
    }

    #[test]
    fn apply_sets_camera_target() {
        let mut ctx = populated(1);
        assert!(ctx.camera_target.is_none());
        apply(&mut ctx, &ScrollProgress::from_scroll(1000.0, 3000.0, 1000.0));
        assert_eq!(ctx.camera_target, Some(WAYPOINTS[1]));
    }

    #[test]
    fn hide_and_restore_is_reversible() {
        let mut ctx = populated(2);
        let depth = |ctx: &SceneContext<_>, i: usize| ctx.scene.get(ctx.mountains[i]).unwrap().transform.position.z;

        for _ in 0..3 {
            apply(&mut ctx, &ScrollProgress::from_progress(0.9));
            apply(&mut ctx, &ScrollProgress::from_progress(0.9));
            for i in 0..4 {
                assert_eq!(depth(&ctx, i), HIDDEN_DEPTH);
            }

            apply(&mut ctx, &ScrollProgress::from_progress(0.2));
            for i in 0..4 {
                assert_eq!(depth(&ctx, i), procgen::MOUNTAIN_LAYERS[i].distance);
            }
        }
    }

    #[test]
    fn threshold_itself_does_not_hide() {
        assert!(!ScrollProgress::from_progress(HIDE_THRESHOLD).mountains_hidden());
        assert!(ScrollProgress::from_progress(0.71).mountains_hidden());
    }

    #[test]
    fn nebula_tracks_back_most_mountain() {
        let mut ctx = populated(3);
        let nebula = ctx.nebula.unwrap();

        apply(&mut ctx, &ScrollProgress::from_progress(0.1));
        assert_eq!(ctx.scene.get(nebula).unwrap().transform.position.z, -200.0);

        apply(&mut ctx, &ScrollProgress::from_progress(0.95));
        assert_eq!(ctx.scene.get(nebula).unwrap().transform.position.z, HIDDEN_DEPTH);
    }

    #[test]
    fn container_matches_page_geometry() {
        let mut page = ScrollContainer::new(1000.0);
        assert_eq!(page.document_height(), 3000.0);
        page.scroll_lines(10.0);
        assert_eq!(page.offset(), 1000.0);
        assert_eq!(page_progress(&page).section, 1);

        page.page_down();
        page.page_down();
        assert_eq!(page.offset(), 2000.0);
        assert_eq!(page_progress(&page).progress, 1.0);

        page.page_up();
        assert_eq!(page.offset(), 1000.0);
        page.home();
        assert_eq!(page.offset(), 0.0);
        page.scroll_by(-10.0);
        assert_eq!(page.offset(), 0.0);
        page.end();
        assert_eq!(page.offset(), 2000.0);
    }

    #[test]
    fn container_resize_keeps_relative_position() {
        let mut page = ScrollContainer::new(1000.0);
        page.scroll_to(500.0);
        page.set_viewport_height(500.0);
        assert_eq!(page.offset(), 250.0);
        assert_eq!(page_progress(&page).progress, 0.25);
    }
}
