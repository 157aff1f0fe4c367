use crate::types::date_window::DateWindow;
use polars::prelude::{col, lit, DataType, LazyFrame, TimeUnit};

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const SPEED_COLUMN: &str = "speed";

pub trait WindFrameFilterExt {
    /// Keeps the rows whose `timestamp` falls on a date inside the window (inclusive).
    ///
    /// # Returns
    /// A new `LazyFrame` with the filter applied. Potential parsing errors
    /// occur during execution (e.g., `collect`).
    fn filter_window(self, window: &DateWindow) -> LazyFrame;

    /// Reduces the frame to a single `speed` row holding the column maximum (null if empty).
    fn max_speed(self) -> LazyFrame;
}

impl WindFrameFilterExt for LazyFrame {
    fn filter_window(self, window: &DateWindow) -> LazyFrame {
        let date = || {
            col(TIMESTAMP_COLUMN)
                .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
                .cast(DataType::Date)
        };
        self.filter(
            date()
                .gt_eq(lit(window.start))
                .and(date().lt_eq(lit(window.end))),
        )
    }

    fn max_speed(self) -> LazyFrame {
        self.select([col(SPEED_COLUMN).cast(DataType::Float64).max()])
    }
}
