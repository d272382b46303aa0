//! Scroll mirroring between the header strip, the name sidebar and the grid.
//!
//! Every surface owns its own position. A scroll observed on one surface is
//! copied to the surface it mirrors, and the copy is recorded as that
//! surface's position right away, so when the mirrored surface reports the
//! value back nothing happens.

/// Positions closer than this are treated as equal.
const EPSILON: f32 = 0.5;

/// One of the three independently scrollable surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Month and day strip above the grid; scrolls horizontally.
    Header,
    /// Event names left of the grid; scrolls vertically.
    Sidebar,
    /// The block grid; scrolls both ways.
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// An observed or requested scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub x: f32,
    pub y: f32,
}

impl ScrollOffset {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A position the host must apply to a surface on its next layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollUpdate {
    pub surface: Surface,
    pub axis: Axis,
    pub offset: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ScrollSync {
    header_x: f32,
    sidebar_y: f32,
    grid: ScrollOffset,
}

impl ScrollSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known position of a surface.
    pub fn position(&self, surface: Surface) -> ScrollOffset {
        match surface {
            Surface::Header => ScrollOffset::new(self.header_x, 0.0),
            Surface::Sidebar => ScrollOffset::new(0.0, self.sidebar_y),
            Surface::Grid => self.grid,
        }
    }

    /// Record the position a surface reported and return the mirror updates
    /// it causes. Axes a surface does not scroll along are ignored.
    pub fn observe(&mut self, surface: Surface, offset: ScrollOffset) -> Vec<ScrollUpdate> {
        let mut updates = Vec::new();
        match surface {
            Surface::Grid => {
                if moved(self.grid.x, offset.x) {
                    self.grid.x = offset.x;
                    if moved(self.header_x, offset.x) {
                        self.header_x = offset.x;
                        updates.push(ScrollUpdate {
                            surface: Surface::Header,
                            axis: Axis::Horizontal,
                            offset: offset.x,
                        });
                    }
                }
                if moved(self.grid.y, offset.y) {
                    self.grid.y = offset.y;
                    if moved(self.sidebar_y, offset.y) {
                        self.sidebar_y = offset.y;
                        updates.push(ScrollUpdate {
                            surface: Surface::Sidebar,
                            axis: Axis::Vertical,
                            offset: offset.y,
                        });
                    }
                }
            }
            Surface::Header => {
                if moved(self.header_x, offset.x) {
                    self.header_x = offset.x;
                    if moved(self.grid.x, offset.x) {
                        self.grid.x = offset.x;
                        updates.push(ScrollUpdate {
                            surface: Surface::Grid,
                            axis: Axis::Horizontal,
                            offset: offset.x,
                        });
                    }
                }
            }
            Surface::Sidebar => {
                if moved(self.sidebar_y, offset.y) {
                    self.sidebar_y = offset.y;
                    if moved(self.grid.y, offset.y) {
                        self.grid.y = offset.y;
                        updates.push(ScrollUpdate {
                            surface: Surface::Grid,
                            axis: Axis::Vertical,
                            offset: offset.y,
                        });
                    }
                }
            }
        }
        updates
    }

    /// Move the grid and the header to `x` together.
    pub fn jump_to_x(&mut self, x: f32) -> Vec<ScrollUpdate> {
        self.grid.x = x;
        self.header_x = x;
        vec![
            ScrollUpdate {
                surface: Surface::Grid,
                axis: Axis::Horizontal,
                offset: x,
            },
            ScrollUpdate {
                surface: Surface::Header,
                axis: Axis::Horizontal,
                offset: x,
            },
        ]
    }
}

fn moved(known: f32, observed: f32) -> bool {
    (known - observed).abs() > EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_x(offset: f32) -> ScrollUpdate {
        ScrollUpdate {
            surface: Surface::Header,
            axis: Axis::Horizontal,
            offset,
        }
    }

    #[test]
    fn grid_scroll_drives_header_once() {
        let mut sync = ScrollSync::new();
        assert_eq!(
            sync.observe(Surface::Grid, ScrollOffset::new(500.0, 0.0)),
            vec![header_x(500.0)]
        );
        // The header reporting the mirrored value must not echo back.
        assert!(sync.observe(Surface::Header, ScrollOffset::new(500.0, 0.0)).is_empty());
        assert!(sync.observe(Surface::Grid, ScrollOffset::new(500.0, 0.0)).is_empty());
        assert_eq!(sync.position(Surface::Header).x, 500.0);
    }

    #[test]
    fn header_scroll_drives_grid() {
        let mut sync = ScrollSync::new();
        let updates = sync.observe(Surface::Header, ScrollOffset::new(120.0, 0.0));
        assert_eq!(
            updates,
            vec![ScrollUpdate {
                surface: Surface::Grid,
                axis: Axis::Horizontal,
                offset: 120.0,
            }]
        );
        assert!(sync.observe(Surface::Grid, ScrollOffset::new(120.0, 0.0)).is_empty());
    }

    #[test]
    fn vertical_scroll_mirrors_between_grid_and_sidebar() {
        let mut sync = ScrollSync::new();
        let updates = sync.observe(Surface::Sidebar, ScrollOffset::new(0.0, 96.0));
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].surface, Surface::Grid);
        assert_eq!(updates[0].axis, Axis::Vertical);

        let updates = sync.observe(Surface::Grid, ScrollOffset::new(0.0, 144.0));
        assert_eq!(
            updates,
            vec![ScrollUpdate {
                surface: Surface::Sidebar,
                axis: Axis::Vertical,
                offset: 144.0,
            }]
        );
        assert_eq!(sync.position(Surface::Sidebar).y, 144.0);
    }

    #[test]
    fn grid_diagonal_scroll_updates_both_mirrors() {
        let mut sync = ScrollSync::new();
        let updates = sync.observe(Surface::Grid, ScrollOffset::new(48.0, 48.0));
        assert_eq!(updates.len(), 2);
    }

    #[test]
    fn sub_pixel_jitter_is_ignored() {
        let mut sync = ScrollSync::new();
        sync.observe(Surface::Grid, ScrollOffset::new(300.0, 0.0));
        assert!(sync.observe(Surface::Header, ScrollOffset::new(300.3, 0.0)).is_empty());
    }

    #[test]
    fn off_axis_values_are_ignored() {
        let mut sync = ScrollSync::new();
        assert!(sync.observe(Surface::Header, ScrollOffset::new(0.0, 80.0)).is_empty());
        assert!(sync.observe(Surface::Sidebar, ScrollOffset::new(80.0, 0.0)).is_empty());
    }

    #[test]
    fn jump_moves_grid_and_header_together() {
        let mut sync = ScrollSync::new();
        let updates = sync.jump_to_x(1_992.0);
        assert_eq!(updates.len(), 2);
        assert!(sync.observe(Surface::Grid, ScrollOffset::new(1_992.0, 0.0)).is_empty());
        assert!(sync.observe(Surface::Header, ScrollOffset::new(1_992.0, 0.0)).is_empty());
    }
}
