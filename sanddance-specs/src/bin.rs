use crate::constants::field_names;
use crate::defaults::{DEFAULT_BINS, MAX_BINS};
use crate::spec::data::DataSpec;
use crate::spec::signal::{SignalBindSpec, SignalSpec};
use crate::spec::transform::bin::{BinExtent, BinTransformSpec};
use crate::spec::transform::sequence::SequenceTransformSpec;
use crate::spec::transform::window::WindowTransformSpec;
use crate::spec::transform::TransformSpec;
use crate::spec::values::{Field, NumberOrSignalSpec, SignalExpressionSpec};
use crate::types::{Column, ColumnKind};
use float_cmp::approx_eq;
use sanddance_common::escape::{escape_field, quote, safe_name};
use serde_json::Value;

/// A column assigned to a role that partitions data into buckets
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteColumn {
    pub column: Column,
    pub default_bins: u32,
    pub maxbins: u32,
    pub maxbins_signal_name: String,
    pub maxbins_signal_display_name: String,
}

impl DiscreteColumn {
    /// A role column with the default bin count, bound to `signal_name`
    pub fn new(column: &Column, signal_name: &str, display_name: &str) -> Self {
        Self {
            column: column.clone(),
            default_bins: DEFAULT_BINS,
            maxbins: MAX_BINS,
            maxbins_signal_name: signal_name.to_string(),
            maxbins_signal_display_name: display_name.to_string(),
        }
    }
}

/// How a column is split into buckets for one layout
#[derive(Debug, Clone, PartialEq)]
pub struct Binnable {
    pub discrete_column: DiscreteColumn,

    /// True when the raw values are the buckets
    pub native: bool,

    /// Unescaped field names downstream layouts group by, bin start first
    pub fields: Vec<String>,

    /// Transforms appended to the source data
    pub transforms: Vec<TransformSpec>,
    pub maxbins_signal: Option<SignalSpec>,
    pub extent_signal: Option<String>,
    pub bin_signal: Option<String>,

    /// One row per bucket, including empty ones
    pub data_sequence: Option<DataSpec>,

    /// Dataset holding every bucket value, used for scale domains
    pub domain_data_name: String,
}

impl Binnable {
    pub fn field(&self) -> &str {
        &self.fields[0]
    }

    /// Fields escaped for use as Vega field references
    pub fn field_refs(&self) -> Vec<String> {
        self.fields.iter().map(|f| escape_field(f)).collect()
    }

    pub fn column(&self) -> &Column {
        &self.discrete_column.column
    }
}

/// Describe how `discrete_column` is bucketed when drawn from `data_name`
pub fn binnable(prefix: &str, data_name: &str, discrete_column: &DiscreteColumn) -> Binnable {
    let column = &discrete_column.column;
    if column.kind() != ColumnKind::Quantitative {
        return Binnable {
            discrete_column: discrete_column.clone(),
            native: true,
            fields: vec![column.name.clone()],
            transforms: Vec::new(),
            maxbins_signal: None,
            extent_signal: None,
            bin_signal: None,
            data_sequence: None,
            domain_data_name: data_name.to_string(),
        };
    }

    let safe = safe_name(&column.name);
    let field = format!("{prefix}_bin_{safe}");
    let field_end = format!("{field}_end");
    let bin_signal = format!("{field}_bins");
    let extent_signal = format!("{prefix}_{safe}_extent");
    let sequence_name = format!("{prefix}_bin_{safe}_sequence");

    let extent_valid = format!("isValid({extent_signal}[0]) && isValid({extent_signal}[1])");
    let transforms = vec![
        TransformSpec::extent(escape_field(&column.name), &extent_signal),
        TransformSpec::Bin(Box::new(BinTransformSpec {
            field: Field::String(escape_field(&column.name)),
            // The renderer clamps a value equal to the extent's max into the last bin
            extent: BinExtent::Signal(SignalExpressionSpec::new(format!(
                "{extent_valid} ? {extent_signal} : [0, 1]"
            ))),
            signal: Some(bin_signal.clone()),
            as_: Some(vec![field.clone(), field_end.clone()]),
            anchor: None,
            maxbins: Some(NumberOrSignalSpec::signal(
                &discrete_column.maxbins_signal_name,
            )),
            base: None,
            step: None,
            minstep: None,
            divide: None,
            nice: None,
            extra: Default::default(),
        })),
    ];

    let maxbins_signal = SignalSpec::value(
        &discrete_column.maxbins_signal_name,
        Value::from(discrete_column.default_bins),
    )
    .with_bind(SignalBindSpec::range(
        &discrete_column.maxbins_signal_display_name,
        1.0,
        discrete_column.maxbins as f64,
        1.0,
    ));

    let ordinal = quote(field_names::ORDINAL);
    let data_sequence = DataSpec::new(&sequence_name).with_transforms(vec![
        TransformSpec::Sequence(SequenceTransformSpec {
            start: NumberOrSignalSpec::signal(format!("{bin_signal}.start")),
            // An empty source yields an empty sequence
            stop: NumberOrSignalSpec::signal(format!(
                "{extent_valid} ? {bin_signal}.stop : {bin_signal}.start"
            )),
            step: Some(NumberOrSignalSpec::signal(format!("{bin_signal}.step"))),
            as_: None,
            extra: Default::default(),
        }),
        TransformSpec::formula("datum.data", &field),
        TransformSpec::formula(format!("datum.data + {bin_signal}.step"), &field_end),
        TransformSpec::Window(WindowTransformSpec::row_number(field_names::ORDINAL)),
        TransformSpec::formula(format!("datum[{ordinal}] == 1"), field_names::FIRST),
        TransformSpec::formula(
            format!(
                "datum[{ordinal}] == length(data({}))",
                quote(&sequence_name)
            ),
            field_names::LAST,
        ),
    ]);

    Binnable {
        discrete_column: discrete_column.clone(),
        native: false,
        fields: vec![field, field_end],
        transforms,
        maxbins_signal: Some(maxbins_signal),
        extent_signal: Some(extent_signal),
        bin_signal: Some(bin_signal),
        data_sequence: Some(data_sequence),
        domain_data_name: sequence_name,
    }
}

/// Bin boundaries the renderer computes for an extent, reproduced for previews
#[derive(Clone, Debug, PartialEq)]
pub struct BinParams {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
    pub n: usize,
}

impl BinParams {
    const BASE: f64 = 10.0;
    const DIVIDE: [f64; 2] = [5.0, 2.0];
    const MINSTEP: f64 = 0.0;

    /// Returns None when there is no extent to bin, e.g. for an empty column
    pub fn compute(extent: Option<[f64; 2]>, maxbins: u32) -> Option<Self> {
        let [min_, max_] = extent?;
        if !min_.is_finite() || !max_.is_finite() || min_ > max_ {
            return None;
        }
        let maxbins = maxbins.max(1) as f64;

        let span = if !approx_eq!(f64, min_, max_) {
            max_ - min_
        } else if !approx_eq!(f64, min_, 0.0) {
            min_.abs()
        } else {
            1.0
        };

        let logb = Self::BASE.ln();
        let level = (maxbins.ln() / logb).ceil();
        let mut step = Self::MINSTEP.max(Self::BASE.powf((span.ln() / logb).round() - level));

        // increase step size if too many bins
        while (span / step).ceil() > maxbins {
            step *= Self::BASE;
        }

        // decrease step size if allowed
        for div in Self::DIVIDE {
            let v = step / div;
            if v >= Self::MINSTEP && span / v <= maxbins {
                step = v;
            }
        }

        let v = step.ln();
        let precision = if v >= 0.0 {
            0.0
        } else {
            (-v / logb).floor() + 1.0
        };
        let eps = Self::BASE.powf(-precision - 1.0);

        let nice_min = (min_ / step + eps).floor() * step;
        let min_ = if min_ < nice_min {
            nice_min - step
        } else {
            nice_min
        };
        let max_ = (max_ / step).ceil() * step;

        let start = min_;
        let stop = if !approx_eq!(f64, max_, min_) {
            max_
        } else {
            min_ + step
        };

        Some(Self {
            start,
            stop,
            step,
            n: ((stop - start) / step).ceil() as usize,
        })
    }

    /// Bin parameters over the extent of raw column values, as the emitted bin transform sees them
    pub fn from_values(values: &[f64], maxbins: u32) -> Option<Self> {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let extent = finite.fold(None, |acc: Option<[f64; 2]>, v| match acc {
            None => Some([v, v]),
            Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
        });
        Self::compute(extent, maxbins)
    }

    /// Start of every bin, as the synthetic sequence data holds them
    pub fn sequence(params: Option<&Self>) -> Vec<f64> {
        match params {
            Some(params) => (0..params.n)
                .map(|i| params.start + i as f64 * params.step)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Row count per bin; values on the upper edge land in the last bin
    pub fn histogram(&self, values: &[f64]) -> Vec<usize> {
        let mut counts = vec![0; self.n];
        if self.n == 0 {
            return counts;
        }
        for value in values.iter().filter(|v| v.is_finite()) {
            if *value < self.start || *value > self.stop {
                continue;
            }
            let index = ((value - self.start) / self.step).floor() as usize;
            counts[index.min(self.n - 1)] += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnType;
    use float_cmp::assert_approx_eq;

    fn discrete(column: Column) -> DiscreteColumn {
        DiscreteColumn {
            column,
            default_bins: 10,
            maxbins: 100,
            maxbins_signal_name: "RoleX_BinsSignal".to_string(),
            maxbins_signal_display_name: "X axis max bins".to_string(),
        }
    }

    #[test]
    fn test_native_column_uses_raw_field() {
        let bin = binnable(
            "bar_0",
            "data_source",
            &discrete(Column::new("Sepal.Kind", ColumnType::String)),
        );
        assert!(bin.native);
        assert_eq!(bin.fields, vec!["Sepal.Kind".to_string()]);
        assert_eq!(bin.field_refs(), vec!["Sepal\\.Kind".to_string()]);
        assert!(bin.transforms.is_empty());
        assert_eq!(bin.domain_data_name, "data_source");
    }

    #[test]
    fn test_quantitative_column_names() {
        let bin = binnable(
            "bar_0",
            "data_source",
            &discrete(Column::new("Petal Width", ColumnType::Number)),
        );
        assert!(!bin.native);
        assert_eq!(
            bin.fields,
            vec![
                "bar_0_bin_Petal_Width".to_string(),
                "bar_0_bin_Petal_Width_end".to_string()
            ]
        );
        assert_eq!(bin.extent_signal.as_deref(), Some("bar_0_Petal_Width_extent"));
        assert_eq!(bin.domain_data_name, "bar_0_bin_Petal_Width_sequence");
        let signal = bin.maxbins_signal.unwrap();
        assert_eq!(signal.name, "RoleX_BinsSignal");
        assert_eq!(signal.value, Some(Value::from(10)));
        assert_eq!(bin.transforms.len(), 2);
        assert_eq!(
            bin.transforms[0].output_signals(),
            vec!["bar_0_Petal_Width_extent".to_string()]
        );
    }

    #[test]
    fn test_bin_params_match_renderer() {
        let params = BinParams::compute(Some([0.0, 100.0]), 10).unwrap();
        assert_approx_eq!(f64, params.step, 10.0);
        assert_eq!(params.n, 10);

        let params = BinParams::compute(Some([3.2, 8.9]), 20).unwrap();
        assert_approx_eq!(f64, params.start, 3.0);
        assert_approx_eq!(f64, params.step, 0.5);
        assert_approx_eq!(f64, params.stop, 9.0);
        assert_eq!(params.n, 12);
    }

    #[test]
    fn test_histogram_keeps_max_edge() {
        let params = BinParams::compute(Some([0.0, 10.0]), 10).unwrap();
        let counts = params.histogram(&[0.0, 0.5, 9.99, 10.0, f64::NAN]);
        assert_eq!(counts.len(), 10);
        assert_eq!(counts[0], 2);
        assert_eq!(counts[9], 2);
        assert_eq!(counts.iter().sum::<usize>(), 4);
    }

    #[test]
    fn test_exact_span_keeps_requested_bins() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let params = BinParams::from_values(&values, 10).unwrap();
        assert_approx_eq!(f64, params.start, 0.0);
        assert_approx_eq!(f64, params.stop, 100.0);
        assert_approx_eq!(f64, params.step, 10.0);
        assert_eq!(params.n, 10);
        assert_eq!(BinParams::sequence(Some(&params)).len(), 10);

        let counts = params.histogram(&values);
        assert_eq!(counts.iter().sum::<usize>(), 101);
        assert_eq!(counts[9], 11);
    }

    #[test]
    fn test_bin_extent_is_column_extent() {
        let bin = binnable(
            "bar_0",
            "data_source",
            &discrete(Column::new("Petal Width", ColumnType::Number)),
        );
        let json = serde_json::to_value(&bin.transforms[1]).unwrap();
        assert_eq!(
            json["extent"],
            serde_json::json!({"signal": "isValid(bar_0_Petal_Width_extent[0]) && isValid(bar_0_Petal_Width_extent[1]) ? bar_0_Petal_Width_extent : [0, 1]"})
        );
    }

    #[test]
    fn test_empty_extent_has_empty_sequence() {
        assert_eq!(BinParams::from_values(&[], 10), None);
        assert!(BinParams::sequence(None).is_empty());
    }
}
