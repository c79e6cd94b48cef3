// Pipelines that drive the alignment core over many tables.

pub mod compare;
pub mod search;

pub use compare::{compare, rank};
pub use search::{search, SearchOptions, SearchReport};
