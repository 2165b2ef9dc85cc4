//! Heddle - dependency-aware issue tracking.
//!
//! Issues block one another; an issue is *ready* when it is open and every
//! issue it is blocked by is closed. The crate is split into:
//!
//! - [`graph`]: the pure dependency graph (readiness, cycles, traversal)
//! - [`service`]: lifecycle operations that keep the graph consistent
//! - [`repository`]: storage backends (in-memory, JSONL)
//! - [`cli`], [`output`], [`app`], [`config`]: the `heddle` binary

#![forbid(unsafe_code)]

pub mod domain;
pub mod error;
pub mod graph;
pub mod id_generation;
pub mod repository;
pub mod service;

pub mod app;
pub mod cli;
pub mod config;
pub mod output;

pub use error::{Error, Result};
