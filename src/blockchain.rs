// Thin re-export module: implementation is in `blockchain/core.rs`, split
// into block/ledger types, validation rules and the shared writer handle.

pub mod core;
pub use core::*;
