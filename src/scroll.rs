/// Rows scrolled past before the "back to top" hint appears.
pub const TOP_HINT_ROWS: usize = 20;

/// Visibility observer for the row that follows the last movie.
///
/// The sentinel only fires while observed, and only for a fully visible row.
/// After a page comes back empty or fails it stays quiet until the row
/// leaves the viewport and enters it again.
#[derive(Debug, Default)]
pub struct Sentinel {
    observing: bool,
    held: bool,
}

impl Sentinel {
    pub fn observe(&mut self) {
        self.observing = true;
    }

    pub fn disconnect(&mut self) {
        self.observing = false;
        self.held = false;
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    /// Suppress triggers until the sentinel is next seen leaving the viewport.
    pub fn hold(&mut self) {
        self.held = true;
    }

    /// Drop a hold without waiting for the sentinel to leave the viewport.
    pub fn release(&mut self) {
        self.held = false;
    }

    /// Report the sentinel's visibility; `idle` is whether a fetch may start.
    /// Returns true when the next page should be requested.
    pub fn update(&mut self, visible: bool, idle: bool) -> bool {
        if !self.observing {
            return false;
        }
        if !visible {
            self.held = false;
            return false;
        }
        idle && !self.held
    }
}

/// Whether the sentinel row (index `len`) lies fully inside a viewport of
/// `rows` rows starting at `offset`.
pub fn sentinel_visible(offset: usize, len: usize, rows: usize) -> bool {
    rows > 0 && offset <= len && len < offset + rows
}

/// Smallest change to `offset` that keeps `selected` on screen.
pub fn offset_for(offset: usize, selected: usize, rows: usize) -> usize {
    if rows == 0 {
        return offset;
    }
    if selected < offset {
        selected
    } else if selected >= offset + rows {
        selected + 1 - rows
    } else {
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unobserved_sentinel_never_fires() {
        let mut sentinel = Sentinel::default();
        assert!(!sentinel.update(true, true));
    }

    #[test]
    fn fires_when_visible_and_idle() {
        let mut sentinel = Sentinel::default();
        sentinel.observe();
        assert!(sentinel.update(true, true));
        assert!(!sentinel.update(true, false));
        assert!(!sentinel.update(false, true));
    }

    #[test]
    fn disconnect_stops_triggers() {
        let mut sentinel = Sentinel::default();
        sentinel.observe();
        sentinel.disconnect();
        assert!(!sentinel.is_observing());
        assert!(!sentinel.update(true, true));
    }

    #[test]
    fn hold_lasts_until_sentinel_leaves_view() {
        let mut sentinel = Sentinel::default();
        sentinel.observe();
        sentinel.hold();
        assert!(!sentinel.update(true, true));
        assert!(!sentinel.update(false, true));
        assert!(sentinel.update(true, true));
    }

    #[test]
    fn release_ends_hold_in_place() {
        let mut sentinel = Sentinel::default();
        sentinel.observe();
        sentinel.hold();
        assert!(!sentinel.update(true, true));
        sentinel.release();
        assert!(sentinel.update(true, true));
    }

    #[test]
    fn visibility_requires_whole_row_in_viewport() {
        // 10 movies, 5 rows: sentinel is row 10.
        assert!(!sentinel_visible(0, 10, 5));
        assert!(!sentinel_visible(5, 10, 5));
        assert!(sentinel_visible(6, 10, 5));
        assert!(sentinel_visible(0, 3, 5));
        assert!(!sentinel_visible(0, 0, 0));
    }

    #[test]
    fn offset_follows_selection() {
        assert_eq!(offset_for(0, 3, 5), 0);
        assert_eq!(offset_for(0, 5, 5), 1);
        assert_eq!(offset_for(4, 2, 5), 2);
        assert_eq!(offset_for(7, 7, 0), 7);
    }
}
