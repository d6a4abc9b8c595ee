//! Export formats for finalized records.

pub mod markdown;
