//! versetree: hierarchical verse outlines
//!
//! Aggregates leaf text into internal nodes, renumbers verse spans across
//! the units of a corpus, and merges externally generated annotations.
//!
//! Layering: `domain` (pure tree algorithms) <- `application` (services over
//! the `FileSystem` trait) <- `infrastructure` (I/O, JSON codec, artifact
//! store, DI) <- `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
