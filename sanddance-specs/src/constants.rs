//! Names that form the wire contract with the renderer and host

/// Synthetic field names written onto data rows
pub mod field_names {
    pub const COLLAPSED: &str = "__SandDance__Collapsed";
    pub const CONTAINS: &str = "__SandDance__Contains";
    pub const TOP: &str = "__SandDance__Top";
    pub const TOP_COLOR: &str = "__SandDance__TopColor";
    pub const TOP_INDEX: &str = "__SandDance__TopIndex";
    pub const FACET_SEARCH: &str = "__SandDance__FacetSearch";
    pub const FACET_TITLE: &str = "__SandDance__FacetTitle";
    pub const ORDINAL: &str = "__SandDance__Ordinal";
    pub const WRAP_COL: &str = "__SandDance__WrapCol";
    pub const WRAP_ROW: &str = "__SandDance__WrapRow";
    pub const FIRST: &str = "__SandDance__First";
    pub const LAST: &str = "__SandDance__Last";
    pub const COUNT: &str = "__SandDance__Count";
}

pub mod data_names {
    pub const ORIGIN: &str = "origin";
    pub const SOURCE: &str = "data_source";
    pub const LEGEND: &str = "data_legend";
    pub const TOP_COLOR_LOOKUP: &str = "data_topcolorlookup";
    pub const FACET_CELL_COL_TITLES: &str = "data_FacetCellColTitles";
    pub const FACET_CELL_ROW_TITLES: &str = "data_FacetCellRowTitles";
}

pub mod scale_names {
    pub const COLOR: &str = "scale_color";
    pub const X: &str = "scale_x";
    pub const Y: &str = "scale_y";
    pub const Z: &str = "scale_z";
}

pub mod signal_names {
    pub const VIEWPORT_WIDTH: &str = "ViewportWidth";
    pub const VIEWPORT_HEIGHT: &str = "ViewportHeight";
    pub const MIN_CELL_WIDTH: &str = "MinCellWidth";
    pub const MIN_CELL_HEIGHT: &str = "MinCellHeight";
    pub const PLOT_OFFSET_LEFT: &str = "PlotOffsetLeft";
    pub const PLOT_OFFSET_TOP: &str = "PlotOffsetTop";
    pub const PLOT_OFFSET_BOTTOM: &str = "PlotOffsetBottom";
    pub const PLOT_OFFSET_RIGHT: &str = "PlotOffsetRight";
    pub const PLOT_HEIGHT_IN: &str = "PlotHeightIn";
    pub const PLOT_WIDTH_IN: &str = "PlotWidthIn";
    pub const PLOT_HEIGHT_OUT: &str = "PlotHeightOut";
    pub const PLOT_WIDTH_OUT: &str = "PlotWidthOut";
    pub const FACET_PADDING_LEFT: &str = "FacetPaddingLeft";
    pub const FACET_PADDING_TOP: &str = "FacetPaddingTop";
    pub const FACET_PADDING_BOTTOM: &str = "FacetPaddingBottom";
    pub const COLOR_BIN_COUNT: &str = "RoleColor_BinCountSignal";
    pub const COLOR_REVERSE: &str = "RoleColor_ReverseSignal";
    pub const FACET_BINS: &str = "RoleFacet_BinsSignal";
    pub const FACET_V_BINS: &str = "RoleFacetV_BinsSignal";
    pub const MARK_OPACITY: &str = "Mark_OpacitySignal";
    pub const POINT_SIZE: &str = "Chart_PointSizeSignal";
    pub const TEXT_ANGLE_X: &str = "Text_AngleXSignal";
    pub const TEXT_ANGLE_Y: &str = "Text_AngleYSignal";
    pub const TEXT_SCALE: &str = "Text_ScaleSignal";
    pub const TEXT_SIZE: &str = "Text_SizeSignal";
    pub const TEXT_TITLE_SIZE: &str = "Text_TitleSizeSignal";
    pub const TREE_MAP_METHOD: &str = "Chart_TreeMapMethodSignal";
    pub const X_BINS: &str = "RoleX_BinsSignal";
    pub const Y_BINS: &str = "RoleY_BinsSignal";
    pub const Z_PROPORTION: &str = "RoleZ_ProportionSignal";
}

/// Color-lookup bucket for categories beyond the legend limit
pub const OTHER: &str = "__Other";

/// Name of the "no-color" palette
pub const COLOR_SCALE_NONE: &str = "none";
