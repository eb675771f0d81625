//! Integration tests for install pre-flight validation
//!
//! # Test Organization
//!
//! - `plan_validation`: Stories about an operator's plan file being checked
//!   before anything is installed
//!
//! - `connectivity`: Stories about probing the plan's nodes over SSH,
//!   including the key gate and per-node failure reporting

mod connectivity;
mod helpers;
mod plan_validation;
