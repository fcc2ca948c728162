//! Continuous scrub mapping for strip images.

/// The 1-based spread under the pointer on a strip of `total` spreads.
///
/// `x` is measured from the strip's left edge. Positions past either edge
/// clamp to the first or last spread. Returns `None` for an empty strip or
/// one with no width.
pub fn spread_at(x: f32, width: f32, total: usize) -> Option<usize> {
    if total == 0 || !(width > 0.0) || x.is_nan() {
        return None;
    }
    let spread_width = width / total as f32;
    let index = (x / spread_width).floor();
    let max = (total - 1) as f32;
    Some(index.clamp(0.0, max) as usize + 1)
}

/// Left offset for a tooltip centred on the pointer, kept inside the
/// container.
pub fn tooltip_left(pointer_x: f32, container_width: f32, tooltip_width: f32) -> f32 {
    let centred = pointer_x - tooltip_width / 2.0;
    let max = (container_width - tooltip_width).max(0.0);
    centred.clamp(0.0, max)
}
