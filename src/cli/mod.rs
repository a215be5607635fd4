// file: src/cli/mod.rs
// version: 1.0.0
// guid: e5a7c9d1-3f60-4b82-94a6-b8c0d2e4f617

//! Command line interface

pub mod args;
pub mod commands;
