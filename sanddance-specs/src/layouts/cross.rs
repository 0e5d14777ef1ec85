use crate::bin::{binnable, Binnable, DiscreteColumn};
use crate::constants::{field_names, signal_names};
use crate::facet_title::{facet_search_expression, facet_title_expression};
use crate::layouts::{Layout, LayoutBuildContext};
use crate::ordinal::{create_ordinals_for_facet, ordinal_scale};
use crate::scope::{
    ChildScopeSpec, LayoutOutput, SignalPatch, SizeSignals, SpecFragment, TitleSource, Titles,
};
use crate::spec::data::DataSpec;
use crate::spec::mark::{MarkEncodingSpec, MarkEncodingsSpec, MarkFacetSpec, MarkSpec};
use crate::spec::signal::SignalSpec;
use crate::spec::transform::lookup::LookupTransformSpec;
use crate::spec::transform::TransformSpec;
use crate::spec::values::Field;
use log::debug;
use sanddance_common::error::Result;
use sanddance_common::escape::{datum_field, escape_field, quote};

/// A grid facet: columns from one discrete column, rows from another
#[derive(Debug, Clone, PartialEq)]
pub struct Cross {
    pub groupby_x: DiscreteColumn,
    pub groupby_y: DiscreteColumn,
}

/// Geometry of one grid axis
struct Dimension<'a> {
    dim: &'static str,
    bin: &'a Binnable,
    layout_size: &'a str,
    min_size: &'static str,
    out: &'static str,
    offset: String,
    padding: String,
}

/// What one grid axis contributes
struct DimensionOutput {
    data_name: String,
    scale_name: String,
    size_signal: String,
    count_signal: String,
    title: TitleSource,
    position: String,
}

impl Cross {
    fn bins(&self, context: &LayoutBuildContext) -> (Binnable, Binnable) {
        let prefix = format!("cross_{}", context.id);
        let data_name = &context.global_scope.data_name;
        (
            binnable(&format!("{prefix}_x"), data_name, &self.groupby_x),
            binnable(&format!("{prefix}_y"), data_name, &self.groupby_y),
        )
    }

    fn add_dimension(
        prefix: &str,
        parent_data: &str,
        global_data: &str,
        d: &Dimension,
        fragment: &mut SpecFragment,
    ) -> DimensionOutput {
        let bin = d.bin;
        let (mut data, scale) = if bin.native {
            let ordinals =
                create_ordinals_for_facet(global_data, &format!("{prefix}_{}", d.dim), bin.field());
            (ordinals.data, ordinals.scale)
        } else {
            fragment
                .global_transforms
                .push((global_data.to_string(), bin.transforms.clone()));
            fragment.global.signals.extend(bin.maxbins_signal.clone());
            let mut sequence = bin
                .data_sequence
                .clone()
                .unwrap_or_else(|| DataSpec::new(&bin.domain_data_name));
            sequence.transform.push(TransformSpec::formula(
                format!(
                    "indata({}, {}, {})",
                    quote(parent_data),
                    quote(&escape_field(bin.field())),
                    datum_field(bin.field())
                ),
                field_names::CONTAINS,
            ));
            let scale = ordinal_scale(
                &sequence.name,
                &format!("scale_{prefix}_{}", d.dim),
                bin.field(),
                field_names::ORDINAL,
            );
            (sequence, scale)
        };
        data.transform.extend([
            TransformSpec::formula(facet_search_expression(bin), field_names::FACET_SEARCH),
            TransformSpec::formula(facet_title_expression(bin), field_names::FACET_TITLE),
        ]);
        let data_name = data.name.clone();
        fragment.global.data.push(data);
        let scale_name = scale.name.clone();
        fragment.global.scales.push(scale);

        let count = format!("{prefix}_count_{}", d.dim);
        let calc = format!("{prefix}_cell_calc_{}", d.dim);
        let size = format!("{prefix}_cell_size_{}", d.dim);
        fragment.global.signals.extend([
            SignalSpec::update(&count, format!("length(data({}))", quote(&data_name))),
            SignalSpec::update(
                &calc,
                format!("{count} > 0 ? ({}) / {count} : ({})", d.layout_size, d.layout_size),
            ),
            SignalSpec::update(
                &size,
                format!("max({}, ({calc} - {}))", d.min_size, d.padding),
            ),
        ]);
        fragment.signal_patches.push(SignalPatch::max(
            d.out,
            format!("(({size} + {}) * {count})", d.padding),
        ));

        let index = format!("(scale({}, {}) - 1)", quote(&scale_name), datum_field(bin.field()));
        let position = format!("{} + {index} * ({size} + {})", d.offset, d.padding);
        DimensionOutput {
            title: TitleSource {
                data_name: data_name.clone(),
                quantitative: bin.column().quantitative,
                offset: position.clone(),
                cell_size: size.clone(),
            },
            data_name,
            scale_name,
            size_signal: size,
            count_signal: count,
            position,
        }
    }
}

impl Layout for Cross {
    fn kind(&self) -> &'static str {
        "Cross"
    }

    fn build(&self, context: &LayoutBuildContext) -> Result<LayoutOutput> {
        let prefix = format!("cross_{}", context.id);
        let cross_data = format!("data_{prefix}_cross");
        let facet_data = format!("data_{prefix}_facet");
        let parent = context.parent_scope;
        let global = context.global_scope;
        let (bin_x, bin_y) = self.bins(context);

        let mut fragment = SpecFragment::default();
        let dimensions = [
            Dimension {
                dim: "x",
                bin: &bin_x,
                layout_size: &parent.size_signals.layout_width,
                min_size: signal_names::MIN_CELL_WIDTH,
                out: signal_names::PLOT_WIDTH_OUT,
                offset: signal_names::FACET_PADDING_LEFT.to_string(),
                padding: signal_names::FACET_PADDING_LEFT.to_string(),
            },
            Dimension {
                dim: "y",
                bin: &bin_y,
                layout_size: &parent.size_signals.layout_height,
                min_size: signal_names::MIN_CELL_HEIGHT,
                out: signal_names::PLOT_HEIGHT_OUT,
                offset: signal_names::FACET_PADDING_TOP.to_string(),
                padding: format!(
                    "({} + {})",
                    signal_names::FACET_PADDING_TOP,
                    signal_names::FACET_PADDING_BOTTOM
                ),
            },
        ];
        let [x, y] = dimensions.map(|d| {
            Self::add_dimension(&prefix, &parent.data_name, &global.data_name, &d, &mut fragment)
        });
        debug!(
            "Cross {} over {} and {} via scales {} and {}",
            prefix, x.data_name, y.data_name, x.scale_name, y.scale_name
        );

        let search_x = format!("{}_x", field_names::FACET_SEARCH);
        let search_y = format!("{}_y", field_names::FACET_SEARCH);
        let lookup = |out: &DimensionOutput, bin: &Binnable, as_: &str| {
            TransformSpec::Lookup(LookupTransformSpec {
                from: out.data_name.clone(),
                key: Field::String(escape_field(bin.field())),
                fields: vec![Field::String(escape_field(bin.field()))],
                values: Some(vec![Field::String(field_names::FACET_SEARCH.to_string())]),
                as_: Some(vec![as_.to_string()]),
                default: None,
                extra: Default::default(),
            })
        };
        fragment.global.data.push(
            DataSpec::from_source(&cross_data, &parent.data_name).with_transforms(vec![
                lookup(&x, &bin_x, &search_x),
                lookup(&y, &bin_y, &search_y),
                TransformSpec::formula(
                    format!(
                        "[datum[{}], merge(datum[{}], {{clause: '&&'}})]",
                        quote(&search_x),
                        quote(&search_y)
                    ),
                    field_names::FACET_SEARCH,
                ),
            ]),
        );

        let update = MarkEncodingsSpec::new()
            .with("x", MarkEncodingSpec::signal(&x.position))
            .with("y", MarkEncodingSpec::signal(&y.position))
            .with("height", MarkEncodingSpec::signal(&y.size_signal))
            .with("width", MarkEncodingSpec::signal(&x.size_signal));
        let mut groupby = bin_x.field_refs();
        groupby.extend(bin_y.field_refs());
        groupby.push(field_names::FACET_SEARCH.to_string());
        let mut mark = MarkSpec::new("group", &prefix)
            .with_facet(MarkFacetSpec {
                name: facet_data.clone(),
                data: cross_data,
                groupby,
                aggregate: None,
            })
            .with_update(update);
        mark.style = Some("cell".to_string());
        fragment.local.marks.push(mark);

        let mut size_signals = SizeSignals::new(&x.size_signal, &y.size_signal);
        size_signals.col_count = Some(x.count_signal.clone());
        size_signals.row_count = Some(y.count_signal.clone());
        let mut scope = ChildScopeSpec::new(&facet_data, size_signals);
        scope.group = Some(prefix);
        scope.titles = Some(Titles {
            x: x.title,
            y: y.title,
        });
        Ok(LayoutOutput { fragment, scope })
    }

    fn grouping(&self, context: &LayoutBuildContext) -> Option<Vec<String>> {
        let (bin_x, bin_y) = self.bins(context);
        Some(bin_x.fields.into_iter().chain(bin_y.fields).collect())
    }
}
