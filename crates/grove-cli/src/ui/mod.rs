//! # CLI UI Module
//!
//! Styling and formatting layer for grove output. Every command that prints
//! for humans goes through [`Style`]; `--json` output bypasses it.
//!
//! - `color`: color mode detection and terminal capability checks
//! - `style`: message types, prefixes, and styling functions
//! - `format`: small formatters (bytes, time, truncation)
//! - `table`: workspace and repository tables with comfy-table
//! - `progress`: spinner for the import pipeline

pub mod color;
pub mod format;
pub mod progress;
pub mod style;
pub mod table;

pub use color::ColorMode;
pub use progress::{Progress, ProgressMode};
pub use style::{MessageType, Style};
