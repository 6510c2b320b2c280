//! Die view lifecycle
//!
//! A `DieView` exists between mount and unmount. It owns the read end of the
//! pointer cell, the rotation controller, the optional float layer and the
//! composer. The host hands it its input subscriptions so that dropping the
//! view (normally or during unwind) always detaches the event handlers.
//!
//! A page kept in the back/forward cache is suspended rather than unmounted,
//! and resumes when it is shown again.

use glam::Vec2;

use crate::die::{
    DiePose, FloatOffset, IdleFloat, PointerReader, PointerSampler, PointerWriter,
    RotationController, Viewport, pointer_cell,
};
use crate::scene::{DieComposer, FrameContext};
use crate::settings::Settings;

/// Converts host timestamps (milliseconds) into seconds since mount
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    start_ms: Option<f64>,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the first valid timestamp; `None` when no time is available
    pub fn tick(&mut self, now_ms: Option<f64>) -> Option<f32> {
        let now = now_ms.filter(|t| t.is_finite())?;
        let start = *self.start_ms.get_or_insert(now);
        self.last_ms = Some(now);
        Some(((now - start).max(0.0) / 1000.0) as f32)
    }

    /// Seconds since mount at the last valid tick
    pub fn elapsed(&self) -> Option<f32> {
        match (self.start_ms, self.last_ms) {
            (Some(start), Some(last)) => Some(((last - start).max(0.0) / 1000.0) as f32),
            _ => None,
        }
    }
}

/// Handle to a host event registration, cancelled when the view goes away
pub trait Subscription {
    fn cancel(&mut self);
}

/// Mounted die: pointer input in, one pose per frame out
pub struct DieView {
    pointer: PointerReader,
    controller: RotationController,
    floating: Option<IdleFloat>,
    composer: DieComposer,
    clock: FrameClock,
    subscriptions: Vec<Box<dyn Subscription>>,
    mounted: bool,
    suspended: bool,
}

impl DieView {
    /// Mount a view; returns it with the pointer writer for the event handler
    pub fn mount(settings: &Settings, seed: u64, viewport: Viewport) -> (Self, PointerInput) {
        let (writer, reader) = pointer_cell();
        let floating = settings
            .effective_idle_float()
            .then(|| IdleFloat::seeded(seed));

        log::info!(
            "Mounting die view (seed {seed}, idle float {})",
            if floating.is_some() { "on" } else { "off" }
        );

        let view = Self {
            pointer: reader,
            controller: RotationController::new(),
            floating,
            composer: DieComposer::default(),
            clock: FrameClock::new(),
            subscriptions: Vec::new(),
            mounted: true,
            suspended: false,
        };
        let input = PointerInput {
            sampler: PointerSampler::new(viewport),
            writer,
        };
        (view, input)
    }

    /// Take ownership of an event registration, cancelled on unmount
    ///
    /// A view that is already unmounted cancels it immediately.
    pub fn attach(&mut self, mut subscription: Box<dyn Subscription>) {
        if !self.mounted {
            subscription.cancel();
            return;
        }
        self.subscriptions.push(subscription);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Frame callbacks should only be scheduled while this is true
    pub fn is_running(&self) -> bool {
        self.mounted && !self.suspended
    }

    /// Page is being hidden; `persisted` means it may come back from the cache
    pub fn page_hidden(&mut self, persisted: bool) {
        if persisted {
            if self.mounted && !self.suspended {
                self.suspended = true;
                log::info!("Die view suspended");
            }
        } else {
            self.unmount();
        }
    }

    /// Page is shown again; returns true when the frame loop must be restarted
    pub fn page_shown(&mut self) -> bool {
        if !self.mounted || !self.suspended {
            return false;
        }
        self.suspended = false;
        log::info!("Die view resumed");
        true
    }

    /// Advance to the host timestamp and pose the die
    ///
    /// Without a usable timestamp, or while suspended, the last pose is kept.
    pub fn frame(&mut self, now_ms: Option<f64>) -> DiePose {
        if !self.is_running() {
            return self.composer.current_pose();
        }
        let Some(t) = self.clock.tick(now_ms) else {
            return self.composer.current_pose();
        };

        let rotation = self.controller.update(t, self.pointer.load());
        let float = self
            .floating
            .as_ref()
            .map(|f| f.sample(t))
            .unwrap_or_default();

        let pose = DiePose::new(&rotation, float);
        self.composer.apply_pose(pose);
        pose
    }

    /// Emit the die's draw calls for the current pose
    pub fn render(&self, frame: &mut FrameContext) {
        frame.begin(self.clock.elapsed().unwrap_or(0.0));
        self.composer.render(frame);
    }

    pub fn current_pose(&self) -> DiePose {
        self.composer.current_pose()
    }

    /// Latest pointer offset seen by the view
    pub fn pointer(&self) -> Vec2 {
        self.pointer.load()
    }

    /// Idle float contribution at the current time (zero when disabled)
    pub fn float_offset(&self) -> FloatOffset {
        self.current_pose().float
    }

    /// Detach input and stop producing frames
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.suspended = false;
        for mut subscription in self.subscriptions.drain(..) {
            subscription.cancel();
        }
        log::info!(
            "Die view unmounted after {} frames",
            self.controller.frames()
        );
    }
}

impl Drop for DieView {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Write side of a mounted view: pointer sampler plus the cell writer
#[derive(Debug)]
pub struct PointerInput {
    sampler: PointerSampler,
    writer: PointerWriter,
}

impl PointerInput {
    /// Handle a raw pointer-move event (window pixels)
    pub fn pointer_moved(&self, raw: Vec2) -> bool {
        self.sampler.sample_into(raw, &self.writer)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.sampler.resize(viewport);
    }

    pub fn viewport(&self) -> Viewport {
        self.sampler.viewport()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TOTAL_PIPS;
    use crate::die::RotationController;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CancelCounter(Rc<Cell<u32>>);

    impl Subscription for CancelCounter {
        fn cancel(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn viewport() -> Viewport {
        Viewport::new(Vec2::new(1000.0, 500.0), Vec2::new(10.0, 5.0))
    }

    fn still() -> Settings {
        Settings {
            reduced_motion: true,
            ..Settings::default()
        }
    }

    #[test]
    fn test_clock_starts_at_first_tick() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.elapsed(), None);
        assert_eq!(clock.tick(Some(5_000.0)), Some(0.0));
        assert_eq!(clock.tick(Some(6_500.0)), Some(1.5));
        assert_eq!(clock.tick(None), None);
        assert_eq!(clock.tick(Some(f64::NAN)), None);
        assert_eq!(clock.elapsed(), Some(1.5));
        // Timestamps going backwards clamp to mount time
        assert_eq!(clock.tick(Some(1_000.0)), Some(0.0));
    }

    #[test]
    fn test_first_frame_is_rest_pose() {
        let (mut view, _input) = DieView::mount(&still(), 1, viewport());
        let pose = view.frame(Some(16.0));
        assert_eq!(pose.rotation.x, 0.0);
        assert_eq!(pose.rotation.y, 0.0);
        assert!((pose.rotation.z - 0.1).abs() < 1e-6);
        assert_eq!(pose.translation(), glam::Vec3::ZERO);
    }

    #[test]
    fn test_pointer_reaches_next_frame() {
        let (mut view, input) = DieView::mount(&still(), 1, viewport());
        view.frame(Some(0.0));

        // Right edge, vertically centered -> offset (1.0, 0.0) for a 10 world-unit wide viewport
        assert!(input.pointer_moved(Vec2::new(1000.0, 250.0)));
        assert!((view.pointer() - Vec2::new(1.0, 0.0)).length() < 1e-5);

        let pose = view.frame(Some(2_000.0));
        let base = RotationController::rotation_at(2.0, Vec2::ZERO);
        assert!((pose.rotation.y - base.angle_y - 0.12).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_viewport_keeps_pointer() {
        let (mut view, mut input) = DieView::mount(&still(), 1, viewport());
        input.pointer_moved(Vec2::new(0.0, 0.0));
        let before = view.pointer();

        input.resize(Viewport::default());
        assert!(!input.pointer_moved(Vec2::new(900.0, 400.0)));
        assert_eq!(view.pointer(), before);
        view.frame(Some(0.0));
    }

    #[test]
    fn test_missing_time_holds_pose() {
        let (mut view, input) = DieView::mount(&Settings::default(), 9, viewport());
        view.frame(Some(0.0));
        let pose = view.frame(Some(3_000.0));
        input.pointer_moved(Vec2::new(10.0, 10.0));
        assert_eq!(view.frame(None), pose);
        assert_eq!(view.current_pose(), pose);
    }

    #[test]
    fn test_idle_float_follows_settings() {
        let (mut floating, _a) = DieView::mount(&Settings::default(), 3, viewport());
        let (mut still_view, _b) = DieView::mount(&still(), 3, viewport());
        floating.frame(Some(0.0));
        still_view.frame(Some(0.0));
        floating.frame(Some(1_234.0));
        still_view.frame(Some(1_234.0));

        assert_ne!(floating.float_offset(), FloatOffset::default());
        assert_eq!(still_view.float_offset(), FloatOffset::default());
        // Same controller rotation either way
        assert_eq!(floating.current_pose().rotation, still_view.current_pose().rotation);
        assert!(floating.float_offset().translation.y.abs() <= 0.2 + 1e-5);
    }

    #[test]
    fn test_render_emits_whole_die() {
        let (mut view, _input) = DieView::mount(&still(), 1, viewport());
        view.frame(Some(0.0));
        view.frame(Some(500.0));
        let mut frame = FrameContext::default();
        view.render(&mut frame);
        assert_eq!(frame.draws().len(), 1 + TOTAL_PIPS);
        assert!((frame.time - 0.5).abs() < 1e-6);

        // Rendering again replaces rather than appends
        view.render(&mut frame);
        assert_eq!(frame.draws().len(), 1 + TOTAL_PIPS);
    }

    #[test]
    fn test_unmount_cancels_once() {
        let cancels = Rc::new(Cell::new(0));
        let (mut view, _input) = DieView::mount(&still(), 1, viewport());
        view.attach(Box::new(CancelCounter(cancels.clone())));
        assert!(view.is_mounted());

        view.unmount();
        assert!(!view.is_mounted());
        assert_eq!(cancels.get(), 1);

        drop(view);
        assert_eq!(cancels.get(), 1);
    }

    #[test]
    fn test_drop_cancels_subscription() {
        let cancels = Rc::new(Cell::new(0));
        {
            let (mut view, _input) = DieView::mount(&still(), 1, viewport());
            view.attach(Box::new(CancelCounter(cancels.clone())));
        }
        assert_eq!(cancels.get(), 1);
    }

    #[test]
    fn test_unmount_cancels_every_subscription() {
        let pointer = Rc::new(Cell::new(0));
        let resize = Rc::new(Cell::new(0));
        let (mut view, _input) = DieView::mount(&still(), 1, viewport());
        view.attach(Box::new(CancelCounter(pointer.clone())));
        view.attach(Box::new(CancelCounter(resize.clone())));
        assert_eq!(pointer.get() + resize.get(), 0);
        view.unmount();
        assert_eq!(pointer.get(), 1);
        assert_eq!(resize.get(), 1);
    }

    #[test]
    fn test_attach_after_unmount_cancels_at_once() {
        let cancels = Rc::new(Cell::new(0));
        let (mut view, _input) = DieView::mount(&still(), 1, viewport());
        view.unmount();
        view.attach(Box::new(CancelCounter(cancels.clone())));
        assert_eq!(cancels.get(), 1);
    }

    #[test]
    fn test_cached_page_resumes() {
        let cancels = Rc::new(Cell::new(0));
        let (mut view, input) = DieView::mount(&still(), 1, viewport());
        view.attach(Box::new(CancelCounter(cancels.clone())));
        view.frame(Some(0.0));
        let held = view.frame(Some(1_000.0));

        view.page_hidden(true);
        assert!(view.is_mounted());
        assert!(!view.is_running());
        assert_eq!(cancels.get(), 0);
        assert_eq!(view.frame(Some(2_000.0)), held);

        assert!(view.page_shown());
        assert!(view.is_running());
        // A second show is not a restart
        assert!(!view.page_shown());

        // Pointer input still reaches the view and the die moves again
        assert!(input.pointer_moved(Vec2::new(1000.0, 250.0)));
        let pose = view.frame(Some(3_000.0));
        let base = RotationController::rotation_at(3.0, Vec2::ZERO);
        assert!((pose.rotation.y - base.angle_y - 0.12).abs() < 1e-5);
    }

    #[test]
    fn test_discarded_page_unmounts() {
        let cancels = Rc::new(Cell::new(0));
        let (mut view, _input) = DieView::mount(&still(), 1, viewport());
        view.attach(Box::new(CancelCounter(cancels.clone())));
        view.page_hidden(false);
        assert!(!view.is_mounted());
        assert_eq!(cancels.get(), 1);
        assert!(!view.page_shown());
        assert!(!view.is_running());
    }

    #[test]
    fn test_unmounted_view_stops_posing() {
        let (mut view, _input) = DieView::mount(&still(), 1, viewport());
        let pose = view.frame(Some(0.0));
        view.unmount();
        assert_eq!(view.frame(Some(10_000.0)), pose);
    }
}
