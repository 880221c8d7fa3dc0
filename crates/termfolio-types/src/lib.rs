//! Foundation types for termfolio.
//!
//! This crate contains the types shared by every termfolio crate: the
//! styled output line model, terminal configuration, and the error type.

pub mod config;
pub mod error;
pub mod output;
