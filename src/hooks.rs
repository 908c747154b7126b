//! View glue: whatever owns the scrollable viewport.

/// The scroll container of a listing view.
pub trait Viewport {
    /// Move the viewport to `offset_px` from the top.
    fn scroll_to(&mut self, offset_px: u32);
}

impl<V: Viewport + ?Sized> Viewport for &mut V {
    fn scroll_to(&mut self, offset_px: u32) {
        (**self).scroll_to(offset_px)
    }
}
