//! Cursor and scroll state for a scrollable pane.

/// Active row and top-left corner of the visible window into a list of
/// rows.
///
/// Navigation methods take the current number of rows (and page size where
/// relevant) and return whether anything changed. None of them leave the
/// active row past the last row or above the first visible row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewPosition {
    pub active_row_index: usize,
    pub view_start_row_index: usize,
    pub view_start_column: usize,
}

impl ViewPosition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_line_down(&mut self, rows: usize) -> bool {
        if self.active_row_index + 1 >= rows {
            return false;
        }
        self.active_row_index += 1;
        true
    }

    pub fn move_line_up(&mut self) -> bool {
        if self.active_row_index == 0 {
            return false;
        }
        self.active_row_index -= 1;
        if self.view_start_row_index > self.active_row_index {
            self.view_start_row_index = self.active_row_index;
        }
        true
    }

    pub fn move_page_down(&mut self, page_rows: usize, rows: usize) -> bool {
        self.move_down_by(page_rows.max(1), rows)
    }

    pub fn move_page_up(&mut self, page_rows: usize) -> bool {
        self.move_up_by(page_rows.max(1))
    }

    pub fn move_half_page_down(&mut self, page_rows: usize, rows: usize) -> bool {
        self.move_down_by((page_rows / 2).max(1), rows)
    }

    pub fn move_half_page_up(&mut self, page_rows: usize) -> bool {
        self.move_up_by((page_rows / 2).max(1))
    }

    pub fn move_to_first_line(&mut self) -> bool {
        if self.active_row_index == 0 && self.view_start_row_index == 0 {
            return false;
        }
        self.active_row_index = 0;
        self.view_start_row_index = 0;
        true
    }

    pub fn move_to_last_line(&mut self, rows: usize) -> bool {
        let last = rows.saturating_sub(1);
        if self.active_row_index == last {
            return false;
        }
        self.active_row_index = last;
        self.view_start_row_index = self.view_start_row_index.min(last);
        true
    }

    /// Shift right by half a page, stopping once the end of the widest
    /// line (`content_cols`) is visible.
    pub fn scroll_right(&mut self, page_cols: usize, content_cols: usize) -> bool {
        let max_start = content_cols.saturating_sub(page_cols);
        if self.view_start_column >= max_start {
            return false;
        }
        self.view_start_column = (self.view_start_column + (page_cols / 2).max(1)).min(max_start);
        true
    }

    pub fn scroll_left(&mut self, page_cols: usize) -> bool {
        if self.view_start_column == 0 {
            return false;
        }
        self.view_start_column = self
            .view_start_column
            .saturating_sub((page_cols / 2).max(1));
        true
    }

    /// Scroll so the active row sits in the middle of the page.
    pub fn center_active_row(&mut self, page_rows: usize) -> bool {
        let start = self.active_row_index.saturating_sub(page_rows / 2);
        if start == self.view_start_row_index {
            return false;
        }
        self.view_start_row_index = start;
        true
    }

    /// Adjust the first visible row so the active row is on a page of
    /// `page_rows` rows, moving the page as little as possible.
    pub fn determine_view_start_row(&mut self, page_rows: usize, rows: usize) {
        self.active_row_index = self.active_row_index.min(rows.saturating_sub(1));

        if self.view_start_row_index > self.active_row_index {
            self.view_start_row_index = self.active_row_index;
        } else if page_rows > 0 && self.active_row_index - self.view_start_row_index >= page_rows {
            self.view_start_row_index = self.active_row_index + 1 - page_rows;
        }

        // Don't leave blank space below the last row when the page could
        // show more of the list.
        self.view_start_row_index = self
            .view_start_row_index
            .min(rows.saturating_sub(page_rows));
    }

    fn move_down_by(&mut self, count: usize, rows: usize) -> bool {
        let last = rows.saturating_sub(1);
        let target = (self.active_row_index + count).min(last);
        if target == self.active_row_index {
            return false;
        }
        self.view_start_row_index += target - self.active_row_index;
        self.active_row_index = target;
        true
    }

    fn move_up_by(&mut self, count: usize) -> bool {
        if self.active_row_index == 0 {
            return false;
        }
        self.active_row_index = self.active_row_index.saturating_sub(count);
        self.view_start_row_index = self.view_start_row_index.saturating_sub(count);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn position(active: usize, start: usize) -> ViewPosition {
        ViewPosition {
            active_row_index: active,
            view_start_row_index: start,
            view_start_column: 0,
        }
    }

    #[test]
    fn start_is_pulled_down_to_active_row() {
        let mut pos = position(5, 9);
        pos.determine_view_start_row(10, 20);
        assert_eq!(pos, position(5, 5));
    }

    #[test]
    fn start_is_pushed_up_to_keep_active_row_on_page() {
        let mut pos = position(15, 2);
        pos.determine_view_start_row(10, 20);
        assert_eq!(pos, position(15, 6));
    }

    #[test]
    fn move_line_down_stops_at_last_row() {
        let mut pos = position(3, 0);
        assert!(pos.move_line_down(5));
        assert_eq!(pos.active_row_index, 4);

        let before = pos;
        assert!(!pos.move_line_down(5));
        assert_eq!(pos, before);
    }

    #[test]
    fn empty_list_keeps_position_at_origin() {
        let mut pos = ViewPosition::new();
        assert!(!pos.move_line_down(0));
        assert!(!pos.move_to_last_line(0));
        pos.determine_view_start_row(10, 0);
        assert_eq!(pos, ViewPosition::new());
    }

    #[test]
    fn page_moves_clamp_to_list_bounds() {
        let mut pos = ViewPosition::new();
        assert!(pos.move_page_down(10, 15));
        pos.determine_view_start_row(10, 15);
        assert_eq!(pos.active_row_index, 10);
        assert_eq!(pos.view_start_row_index, 5);

        assert!(pos.move_page_down(10, 15));
        assert_eq!(pos.active_row_index, 14);
        assert!(!pos.move_page_down(10, 15));

        assert!(pos.move_half_page_up(10));
        assert_eq!(pos.active_row_index, 9);
    }

    #[test]
    fn paging_past_the_end_moves_the_page_only_as_far_as_the_cursor() {
        let mut pos = position(10, 5);
        assert!(pos.move_page_down(10, 15));
        assert_eq!(pos, position(14, 9));

        let mut pos = position(2, 0);
        assert!(pos.move_half_page_down(20, 4));
        assert_eq!(pos, position(3, 1));
    }

    #[test]
    fn horizontal_scroll_stays_within_content() {
        let mut pos = ViewPosition::new();
        assert!(!pos.scroll_left(20));
        assert!(!pos.scroll_right(20, 15));

        assert!(pos.scroll_right(20, 100));
        assert_eq!(pos.view_start_column, 10);
        assert!(pos.scroll_right(20, 35));
        assert_eq!(pos.view_start_column, 15);
        assert!(!pos.scroll_right(20, 35));

        assert!(pos.scroll_left(40));
        assert_eq!(pos.view_start_column, 0);
    }

    #[derive(Debug, Clone)]
    enum Nav {
        Down,
        Up,
        PageDown,
        PageUp,
        HalfDown,
        HalfUp,
        First,
        Last,
        Center,
    }

    fn nav() -> impl Strategy<Value = Nav> {
        prop_oneof![
            Just(Nav::Down),
            Just(Nav::Up),
            Just(Nav::PageDown),
            Just(Nav::PageUp),
            Just(Nav::HalfDown),
            Just(Nav::HalfUp),
            Just(Nav::First),
            Just(Nav::Last),
            Just(Nav::Center),
        ]
    }

    proptest! {
        #[test]
        fn navigation_keeps_active_row_in_bounds(
            rows in 1usize..200,
            page_rows in 1usize..40,
            moves in prop::collection::vec(nav(), 0..60),
        ) {
            let mut pos = ViewPosition::new();
            for step in moves {
                match step {
                    Nav::Down => { pos.move_line_down(rows); }
                    Nav::Up => { pos.move_line_up(); }
                    Nav::PageDown => { pos.move_page_down(page_rows, rows); }
                    Nav::PageUp => { pos.move_page_up(page_rows); }
                    Nav::HalfDown => { pos.move_half_page_down(page_rows, rows); }
                    Nav::HalfUp => { pos.move_half_page_up(page_rows); }
                    Nav::First => { pos.move_to_first_line(); }
                    Nav::Last => { pos.move_to_last_line(rows); }
                    Nav::Center => { pos.center_active_row(page_rows); }
                }
                pos.determine_view_start_row(page_rows, rows);

                prop_assert!(pos.active_row_index < rows);
                prop_assert!(pos.view_start_row_index <= pos.active_row_index);
                prop_assert!(pos.active_row_index < pos.view_start_row_index + page_rows);
            }
        }

        #[test]
        fn every_move_keeps_start_at_or_above_active_row(
            rows in 1usize..200,
            page_rows in 1usize..40,
            moves in prop::collection::vec(nav(), 0..60),
        ) {
            let mut pos = ViewPosition::new();
            for step in moves {
                match step {
                    Nav::Down => { pos.move_line_down(rows); }
                    Nav::Up => { pos.move_line_up(); }
                    Nav::PageDown => { pos.move_page_down(page_rows, rows); }
                    Nav::PageUp => { pos.move_page_up(page_rows); }
                    Nav::HalfDown => { pos.move_half_page_down(page_rows, rows); }
                    Nav::HalfUp => { pos.move_half_page_up(page_rows); }
                    Nav::First => { pos.move_to_first_line(); }
                    Nav::Last => { pos.move_to_last_line(rows); }
                    Nav::Center => { pos.center_active_row(page_rows); }
                }

                prop_assert!(pos.active_row_index < rows);
                prop_assert!(
                    pos.view_start_row_index <= pos.active_row_index,
                    "start {} > active {} after {:?}",
                    pos.view_start_row_index,
                    pos.active_row_index,
                    step
                );
            }
        }

        #[test]
        fn determine_view_start_row_is_idempotent(
            active in 0usize..300,
            start in 0usize..300,
            rows in 0usize..200,
            page_rows in 0usize..40,
        ) {
            let mut once = position(active, start);
            once.determine_view_start_row(page_rows, rows);
            let mut twice = once;
            twice.determine_view_start_row(page_rows, rows);
            prop_assert_eq!(once, twice);
        }
    }
}
