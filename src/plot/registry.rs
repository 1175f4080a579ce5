//! Registry of supported plot types

use polars::prelude::DataFrame;
use std::sync::Arc;

use super::figure::{self, Figure};
use crate::constants::plot::DEFAULT_HISTOGRAM_BINS;
use crate::error::Result;
use crate::state::ColArgs;

/// Builds a figure from a frame, a title and the filtered column arguments
pub type Builder = Arc<dyn Fn(&DataFrame, &str, &ColArgs) -> Result<Figure> + Send + Sync>;

/// Column arguments understood by the built-in plot types
pub const BASIC_COL_ARGS: &[&str] = &["x", "y", "color"];

const XY_OPTIONS: &[&str] = &["log_x", "log_y"];
const BAR_OPTIONS: &[&str] = &["orientation", "log_y"];
const HISTOGRAM_OPTIONS: &[&str] = &["orientation", "histfunc", "log_x", "log_y"];

/// Descriptor of one plot type
#[derive(Clone)]
pub struct PlotSpec {
    pub name: String,
    pub label: String,
    pub col_args: Vec<String>,
    /// Non-column settings kept in `col_args` (see `plot::options`)
    pub options: Vec<String>,
    pub build: Builder,
}

impl PlotSpec {
    pub fn new<F>(name: &str, label: &str, col_args: &[&str], build: F) -> Self
    where
        F: Fn(&DataFrame, &str, &ColArgs) -> Result<Figure> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            col_args: col_args.iter().map(|a| a.to_string()).collect(),
            options: Vec::new(),
            build: Arc::new(build),
        }
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }

    pub fn accepts(&self, arg: &str) -> bool {
        self.col_args.iter().chain(&self.options).any(|a| a == arg)
    }

    /// Keep only the arguments this plot type accepts; others are dropped silently
    pub fn filter_args(&self, args: &ColArgs) -> ColArgs {
        args.iter()
            .filter(|(k, _)| self.accepts(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl std::fmt::Debug for PlotSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlotSpec")
            .field("name", &self.name)
            .field("col_args", &self.col_args)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Ordered set of plot specs, looked up by name
#[derive(Clone, Debug, Default)]
pub struct PlotRegistry {
    specs: Vec<PlotSpec>,
}

impl PlotRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scatter, line, area, bar and histogram
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(PlotSpec::new("scatter", "Scatter", BASIC_COL_ARGS, figure::scatter).with_options(XY_OPTIONS));
        registry.register(PlotSpec::new("line", "Line", BASIC_COL_ARGS, figure::line).with_options(XY_OPTIONS));
        registry.register(PlotSpec::new("area", "Area", BASIC_COL_ARGS, figure::area).with_options(XY_OPTIONS));
        registry.register(PlotSpec::new("bar", "Bar", BASIC_COL_ARGS, figure::bar).with_options(BAR_OPTIONS));
        registry.set_histogram_bins(DEFAULT_HISTOGRAM_BINS);
        registry
    }

    /// Built-in specs with a fixed histogram bin count
    pub fn with_histogram_bins(bins: usize) -> Self {
        let mut registry = Self::builtin();
        registry.set_histogram_bins(bins);
        registry
    }

    pub fn set_histogram_bins(&mut self, bins: usize) {
        self.register(
            PlotSpec::new("histogram", "Histogram", BASIC_COL_ARGS, move |df, title, args| {
                figure::histogram_with_bins(df, title, args, bins)
            })
            .with_options(HISTOGRAM_OPTIONS),
        );
    }

    /// Add a spec, replacing any spec with the same name
    pub fn register(&mut self, spec: PlotSpec) {
        match self.specs.iter_mut().find(|s| s.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
    }

    pub fn get(&self, plot_type: &str) -> Option<&PlotSpec> {
        self.specs.iter().find(|s| s.name == plot_type)
    }

    /// Specs in registration order
    pub fn specs(&self) -> impl Iterator<Item = &PlotSpec> {
        self.specs.iter()
    }

    /// Display label for a plot type, falling back to the raw name
    pub fn label<'a>(&'a self, plot_type: &'a str) -> &'a str {
        self.get(plot_type).map_or(plot_type, |s| s.label.as_str())
    }
}

/// Human label for a plotting argument: "x" -> "X-axis", "line_group" -> "Line Group"
pub fn arg_label(arg: &str) -> String {
    match arg {
        "x" => "X-axis".to_string(),
        "y" => "Y-axis".to_string(),
        "z" => "Z-axis".to_string(),
        other => other
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}
