// file: src/logging/mod.rs
// version: 1.0.0
// guid: b4d6f8a0-2e59-4c71-86b3-d9f1a0c2e473

//! Logging infrastructure

pub mod logger;
