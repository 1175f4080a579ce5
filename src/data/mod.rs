pub mod frame;
pub mod pipeline;

// Re-export key types for convenience
pub use frame::DfHandle;
pub use pipeline::ActionsState;
