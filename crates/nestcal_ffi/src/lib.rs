//! FFI surface crate for the dashboard UI shell.

pub mod api;
