// file: src/utils/mod.rs
// version: 1.0.0
// guid: e5a7c9d1-3b82-4f64-a0d7-58c1e92b6f03

//! Utility functions for the Ubuntu ISO builder

pub mod crypto;
pub mod system;
