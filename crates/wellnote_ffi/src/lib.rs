//! Flutter bridge for the WellNote journal core.
//!
//! Exported API lives in [`api`]; the Dart side binds to it through
//! flutter_rust_bridge codegen.

pub mod api;
