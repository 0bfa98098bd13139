// Utilities for the drive module
pub mod error;
pub mod path;
pub mod progress;
pub mod size;
pub mod space;

/// Output format for commands that can render machine-readable results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human friendly one line per item
    Human,
    /// Single JSON document
    Json,
}
