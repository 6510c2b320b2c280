//! Pointer sampling and the single-slot pointer cell
//!
//! The event handler is the only writer, the frame callback the only reader.
//! Both `f32` components share one `AtomicU64`, so a read never observes half
//! of one sample and half of another. Last write wins; nothing is queued.

use glam::Vec2;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::consts::POINTER_VIEWPORT_FRACTION;

#[inline]
fn pack(v: Vec2) -> u64 {
    ((v.x.to_bits() as u64) << 32) | v.y.to_bits() as u64
}

#[inline]
fn unpack(bits: u64) -> Vec2 {
    Vec2::new(f32::from_bits((bits >> 32) as u32), f32::from_bits(bits as u32))
}

/// Create a single-slot pointer cell (centered), split into its two ends
pub fn pointer_cell() -> (PointerWriter, PointerReader) {
    let slot = Arc::new(AtomicU64::new(pack(Vec2::ZERO)));
    (
        PointerWriter { slot: slot.clone() },
        PointerReader { slot },
    )
}

/// Write end of the pointer cell (owned by the pointer event handler)
#[derive(Debug)]
pub struct PointerWriter {
    slot: Arc<AtomicU64>,
}

impl PointerWriter {
    /// Publish a new offset, replacing whatever was there
    #[inline]
    pub fn store(&self, offset: Vec2) {
        self.slot.store(pack(offset), Ordering::Release);
    }
}

/// Read end of the pointer cell (owned by the frame callback)
#[derive(Debug)]
pub struct PointerReader {
    slot: Arc<AtomicU64>,
}

impl PointerReader {
    /// Latest published offset
    #[inline]
    pub fn load(&self) -> Vec2 {
        unpack(self.slot.load(Ordering::Acquire))
    }
}

/// Visible area: window size in pixels and world-space size at the die
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub pixels: Vec2,
    pub world: Vec2,
}

impl Viewport {
    pub fn new(pixels: Vec2, world: Vec2) -> Self {
        Self { pixels, world }
    }

    /// False until the host has laid out a non-empty area
    pub fn is_valid(&self) -> bool {
        let ok = |v: Vec2| v.is_finite() && v.x > 0.0 && v.y > 0.0;
        ok(self.pixels) && ok(self.world)
    }
}

/// Converts raw window pixel coordinates into viewport-scaled pointer offsets
#[derive(Debug, Clone, Default)]
pub struct PointerSampler {
    viewport: Viewport,
}

impl PointerSampler {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    /// Update the viewport after a resize
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Normalize a window-relative pointer position
    ///
    /// Returns `None` while the viewport is degenerate (not laid out yet).
    pub fn sample(&self, raw: Vec2) -> Option<Vec2> {
        if !self.viewport.is_valid() {
            log::trace!("Skipping pointer sample, viewport not ready: {:?}", self.viewport);
            return None;
        }

        let pixels = self.viewport.pixels;
        let ndc = Vec2::new(
            (raw.x / pixels.x) * 2.0 - 1.0,
            -(raw.y / pixels.y) * 2.0 + 1.0,
        );

        Some(ndc * self.viewport.world * POINTER_VIEWPORT_FRACTION)
    }

    /// Sample and publish into the pointer cell; returns whether a value was written
    pub fn sample_into(&self, raw: Vec2, writer: &PointerWriter) -> bool {
        match self.sample(raw) {
            Some(offset) => {
                writer.store(offset);
                true
            }
            None => false,
        }
    }
}
