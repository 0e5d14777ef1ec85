use crate::bin::DiscreteColumn;
use crate::constants::signal_names;
use crate::defaults::{
    FACET_PADDING_BOTTOM, FACET_PADDING_LEFT, FACET_PADDING_TOP, FACET_PLOT_PADDING_X,
    FACET_PLOT_PADDING_Y,
};
use crate::layouts::cross::Cross;
use crate::layouts::wrap::Wrap;
use crate::layouts::LayoutPair;
use crate::spec::signal::SignalSpec;
use crate::types::FacetStyle;
use log::debug;

/// Space reserved around a faceted plot, taken by the top and right plot offsets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPadding {
    pub x: f64,
    pub y: f64,
}

/// The layout that subdivides the plot into facet cells, plus the decorations it needs
#[derive(Debug, Clone, PartialEq)]
pub struct FacetLayout {
    pub signals: Vec<SignalSpec>,
    pub layout_pair: LayoutPair,
    pub plot_padding: PlotPadding,

    /// Each cell carries its own title
    pub cell_titles: bool,

    /// Titles run along the top and left edges of the grid
    pub col_row_titles: bool,
}

fn padding_signals() -> Vec<SignalSpec> {
    [
        (signal_names::FACET_PADDING_TOP, FACET_PADDING_TOP),
        (signal_names::FACET_PADDING_BOTTOM, FACET_PADDING_BOTTOM),
        (signal_names::FACET_PADDING_LEFT, FACET_PADDING_LEFT),
    ]
    .into_iter()
    .map(|(name, value)| SignalSpec::update(name, value.to_string()))
    .collect()
}

/// Choose the grid or flow facet layout; a grid needs a vertical facet column
pub fn get_facet_layout(
    style: FacetStyle,
    facet: DiscreteColumn,
    facet_v: Option<DiscreteColumn>,
) -> FacetLayout {
    let plot_padding = PlotPadding {
        x: FACET_PLOT_PADDING_X,
        y: FACET_PLOT_PADDING_Y,
    };
    match (style, facet_v) {
        (FacetStyle::Cross, Some(facet_v)) => {
            debug!(
                "Crossing facets {} and {}",
                facet.column.name, facet_v.column.name
            );
            FacetLayout {
                signals: padding_signals(),
                layout_pair: LayoutPair::Cross(Cross {
                    groupby_x: facet,
                    groupby_y: facet_v,
                }),
                plot_padding,
                cell_titles: false,
                col_row_titles: true,
            }
        }
        _ => {
            debug!("Wrapping facet {}", facet.column.name);
            FacetLayout {
                signals: padding_signals(),
                layout_pair: LayoutPair::Wrap(Wrap { groupby: facet }),
                plot_padding,
                cell_titles: true,
                col_row_titles: false,
            }
        }
    }
}
