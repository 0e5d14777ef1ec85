//! Numeric layout defaults

pub const DEFAULT_BINS: u32 = 10;
pub const MAX_BINS: u32 = 100;

pub const MIN_BAR_BAND_WIDTH: f64 = 15.0;
pub const MIN_FACET_WIDTH: f64 = 140.0;
pub const MIN_FACET_HEIGHT: f64 = 180.0;

pub const AXES_OFFSET_X: f64 = 120.0;
pub const AXES_OFFSET_Y: f64 = 120.0;
pub const AXES_TITLE_PADDING_X: f64 = 30.0;
pub const AXES_TITLE_PADDING_Y: f64 = 60.0;
pub const AXES_TITLE_PADDING_FACET_X: f64 = 69.0;
pub const AXES_TITLE_PADDING_FACET_Y: f64 = 92.0;
pub const AXES_LABEL_LIMIT: f64 = 100.0;
pub const AXES_TITLE_LIMIT: f64 = 100.0;

pub const FACET_PADDING_LEFT: f64 = 40.0;
pub const FACET_PADDING_TOP: f64 = 30.0;
pub const FACET_PADDING_BOTTOM: f64 = 40.0;
pub const FACET_PLOT_PADDING_X: f64 = 80.0;
pub const FACET_PLOT_PADDING_Y: f64 = 40.0;
pub const FACET_TITLE_LIMIT: f64 = 120.0;

pub const SCATTER_SIZED_MIN: f64 = 10.0;
pub const SCATTER_SIZED_MAX: f64 = 400.0;
pub const DEFAULT_POINT_SIZE: f64 = 5.0;

pub const DEFAULT_COLOR_BIN_COUNT: u32 = 7;
pub const MAX_COLOR_BIN_COUNT: u32 = 20;
pub const DEFAULT_MAX_LEGENDS: usize = 19;

pub const DEFAULT_Z_PROPORTION: f64 = 0.6;
pub const DEFAULT_TEXT_SIZE: f64 = 10.0;
pub const DEFAULT_TEXT_TITLE_SIZE: f64 = 15.0;
pub const DEFAULT_TICK_SIZE: f64 = 10.0;

