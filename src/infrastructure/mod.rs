//! # Infrastructure Layer
//!
//! Implementations of the domain traits against external systems: the
//! model backend over HTTP and the sandbox mount target on local disk.

pub mod backend;
pub mod sandbox;
