//! Offset providers.

mod static_table;

pub use static_table::StaticOffsetProvider;
