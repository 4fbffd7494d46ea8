//! # Application Layer
//!
//! The translation pipeline: model response text → parsed actions →
//! sequenced steps → reconciled tree → projected mount description.

pub mod mount;
pub mod parsing;
pub mod session;
pub mod steps;
pub mod tree;
