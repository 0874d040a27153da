//! Traits shared by the vectorize support crates.
//!
//! # Modules
//!
//! - [`memory_owner`]: Traits for aligned memory blocks whose ownership can be
//!   handed to a host runtime

pub mod memory_owner;
