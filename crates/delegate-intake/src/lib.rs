//! Registration intake pipeline for conference delegates.
//!
//! The [`workflows::registration`] module holds the wizard, its validation
//! gates, the sequential attachment uploader, the fee calculator and the
//! submission coordinator. [`config`], [`telemetry`] and [`error`] carry the
//! process-level concerns shared by the HTTP service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
