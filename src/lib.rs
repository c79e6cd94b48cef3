// tableunion: unionable column discovery.
//
// This is the library root. Each module corresponds to one stage of
// finding and aligning unionable tables: load tables, embed their columns,
// compare, match, and report.

pub mod alignment;
pub mod config;
pub mod embedding;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod retrieval;
pub mod status;
pub mod table;
