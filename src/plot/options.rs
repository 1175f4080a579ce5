//! Plot options stored next to the column bindings
//!
//! Options live in a plot's `col_args` under their own names ("log_x",
//! "orientation", ...) so they persist, survive plot type changes and are
//! filtered per type exactly like column arguments.

use crate::error::{PlotError, Result};
use crate::state::ColArgs;

/// How an option is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// "true" / "false", unset means false
    Toggle,
    /// One of `(value, label)`; the first entry is the default
    Choice(&'static [(&'static str, &'static str)]),
}

#[derive(Debug, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: OptionKind,
}

const OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        name: "orientation",
        label: "Orientation",
        kind: OptionKind::Choice(&[("v", "Vertical"), ("h", "Horizontal")]),
    },
    OptionSpec {
        name: "histfunc",
        label: "Aggregate Function",
        kind: OptionKind::Choice(&[
            ("count", "Count"),
            ("sum", "Sum"),
            ("avg", "Average"),
            ("min", "Min"),
            ("max", "Max"),
        ]),
    },
    OptionSpec {
        name: "log_x",
        label: "Logarithmic X-axis",
        kind: OptionKind::Toggle,
    },
    OptionSpec {
        name: "log_y",
        label: "Logarithmic Y-axis",
        kind: OptionKind::Toggle,
    },
];

/// Editing metadata for a known option
pub fn option_spec(name: &str) -> Option<&'static OptionSpec> {
    OPTIONS.iter().find(|o| o.name == name)
}

/// Aggregation applied to the values that fall into one histogram bin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl HistFunc {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "count" => Some(HistFunc::Count),
            "sum" => Some(HistFunc::Sum),
            "avg" => Some(HistFunc::Avg),
            "min" => Some(HistFunc::Min),
            "max" => Some(HistFunc::Max),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HistFunc::Count => "count",
            HistFunc::Sum => "sum",
            HistFunc::Avg => "avg",
            HistFunc::Min => "min",
            HistFunc::Max => "max",
        }
    }

    /// Bin height, or `None` when an empty bin has no meaningful value
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        match self {
            HistFunc::Count => Some(values.len() as f64),
            HistFunc::Sum => Some(values.iter().sum()),
            HistFunc::Avg if values.is_empty() => None,
            HistFunc::Avg => Some(values.iter().sum::<f64>() / values.len() as f64),
            HistFunc::Min => values.iter().copied().reduce(f64::min),
            HistFunc::Max => values.iter().copied().reduce(f64::max),
        }
    }
}

/// Options parsed from a plot's arguments
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlotOptions {
    pub log_x: bool,
    pub log_y: bool,
    /// Bars run along the horizontal axis
    pub horizontal: bool,
    /// Explicit histogram aggregation
    pub histfunc: Option<HistFunc>,
}

fn invalid(option: &str, value: &str) -> PlotError {
    PlotError::InvalidOption {
        option: option.to_string(),
        value: value.to_string(),
    }
}

fn flag(args: &ColArgs, name: &str) -> Result<bool> {
    match args.get(name).map(String::as_str) {
        None | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(invalid(name, other)),
    }
}

impl PlotOptions {
    pub fn from_args(args: &ColArgs) -> Result<Self> {
        let horizontal = match args.get("orientation").map(String::as_str) {
            None | Some("v") => false,
            Some("h") => true,
            Some(other) => return Err(invalid("orientation", other)),
        };
        let histfunc = match args.get("histfunc") {
            None => None,
            Some(value) => Some(HistFunc::parse(value).ok_or_else(|| invalid("histfunc", value))?),
        };
        Ok(Self {
            log_x: flag(args, "log_x")?,
            log_y: flag(args, "log_y")?,
            horizontal,
            histfunc,
        })
    }
}

/// Map points onto log10 axes, dropping the ones a log axis cannot show
pub fn log_scale(points: Vec<[f64; 2]>, log_x: bool, log_y: bool) -> Vec<[f64; 2]> {
    if !log_x && !log_y {
        return points;
    }
    points
        .into_iter()
        .filter(|p| (!log_x || p[0] > 0.0) && (!log_y || p[1] > 0.0))
        .map(|[x, y]| {
            [
                if log_x { x.log10() } else { x },
                if log_y { y.log10() } else { y },
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> ColArgs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_options() {
        assert_eq!(PlotOptions::from_args(&ColArgs::new()).unwrap(), PlotOptions::default());

        let opts = PlotOptions::from_args(&args(&[
            ("x", "a"),
            ("log_y", "true"),
            ("orientation", "h"),
            ("histfunc", "avg"),
        ]))
        .unwrap();
        assert!(!opts.log_x && opts.log_y && opts.horizontal);
        assert_eq!(opts.histfunc, Some(HistFunc::Avg));

        let err = PlotOptions::from_args(&args(&[("orientation", "diagonal")])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value 'diagonal' for option 'orientation'");
        assert!(PlotOptions::from_args(&args(&[("log_x", "yes")])).is_err());
    }

    #[test]
    fn test_hist_funcs() {
        let values = [2.0, 8.0, 5.0];
        assert_eq!(HistFunc::Count.apply(&values), Some(3.0));
        assert_eq!(HistFunc::Sum.apply(&values), Some(15.0));
        assert_eq!(HistFunc::Avg.apply(&values), Some(5.0));
        assert_eq!(HistFunc::Min.apply(&values), Some(2.0));
        assert_eq!(HistFunc::Max.apply(&values), Some(8.0));

        assert_eq!(HistFunc::Sum.apply(&[]), Some(0.0));
        assert_eq!(HistFunc::Avg.apply(&[]), None);
        assert_eq!(HistFunc::parse(HistFunc::Max.name()), Some(HistFunc::Max));
    }

    #[test]
    fn test_log_scale_drops_non_positive() {
        let points = vec![[1.0, 100.0], [10.0, 0.0], [-1.0, 10.0], [100.0, 1.0]];
        assert_eq!(log_scale(points.clone(), false, false), points);
        assert_eq!(log_scale(points.clone(), true, true), vec![[0.0, 2.0], [2.0, 0.0]]);
        assert_eq!(log_scale(points, false, true), vec![[1.0, 2.0], [-1.0, 1.0], [100.0, 0.0]]);
    }

    #[test]
    fn test_option_specs() {
        assert_eq!(option_spec("log_x").map(|o| o.kind), Some(OptionKind::Toggle));
        let Some(OptionKind::Choice(choices)) = option_spec("orientation").map(|o| o.kind) else {
            panic!("orientation should be a choice");
        };
        assert_eq!(choices[0], ("v", "Vertical"));
        assert!(option_spec("hover_name").is_none());
    }
}
