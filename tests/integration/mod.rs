//! Integration test suite for the deployKF CLI
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cache_behavior**: artifact cache hits, misses and failed downloads
//! - **cli**: the `deploykf` binary, argument handling and error output
//! - **generate_flow**: the generate workflow through the library API
//! - **output_protocol**: output directory marker and clean safety

#[path = "../common/mod.rs"]
mod common;

mod cache_behavior;
mod cli;
mod generate_flow;
mod output_protocol;
