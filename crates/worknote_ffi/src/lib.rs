//! FFI surface for the WorkNote UI shell.

pub mod api;
