//! Plot types, figure builders and memoized derivation

pub mod derive;
pub mod figure;
pub mod options;
pub mod registry;

pub use derive::{FigureCell, FigureOutcome};
pub use figure::{Figure, FigureKind};
pub use registry::{PlotRegistry, arg_label};
