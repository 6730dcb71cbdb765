#![forbid(unsafe_code)]

//! Core domain model and scheduling engine for progressive overload programs.
//!
//! This crate provides:
//! - Domain types (programs, days, plans, results, adaptation state)
//! - Plan synthesis and rolling window generation
//! - Adaptation and test re-base rules
//! - Program operations over an injected store
//! - Persistence (in-memory and file-backed stores, CSV export)
//! - Configuration and logging

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod plan;
pub mod generator;
pub mod adaptation;
pub mod today;
pub mod store;
pub mod file_store;
pub mod export;
pub mod scheduler;

// Re-export commonly used types
pub use error::{Error, ErrorKind, Result};
pub use types::*;
pub use config::Config;
pub use store::{MemoryStore, ProgramRecord, ProgramStore};
pub use file_store::FileStore;
pub use today::TodayPick;
pub use scheduler::{CreatedProgram, ProgramView, Scheduler, TestOutcome, WorkoutOutcome};
