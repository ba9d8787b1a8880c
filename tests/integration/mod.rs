//! Integration test suite for reqplan.
//!
//! These tests drive the public API from a requirements document to a
//! routed, laid-out plan, and from a resource collection to ranked
//! retrieval. They verify that the stages agree with each other.
//!
//! # Test Categories
//!
//! - `pipeline_e2e`: Document to plan, graph and layout
//! - `relevance_e2e`: Resource retrieval and usage tracking
//! - `config_e2e`: Configuration files and log output


mod config_e2e;
mod pipeline_e2e;
