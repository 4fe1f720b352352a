//! Domain logic for the hive review workflow.
//!
//! Everything here is storage-agnostic: key parsing for the image catalog,
//! classification labels, detector output parsing, browse pagination and
//! the export archive builder.

pub mod catalog;
pub mod classification;
pub mod detection;
pub mod error;
pub mod export;
pub mod pagination;
pub mod types;
