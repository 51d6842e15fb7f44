//! Kill-criteria review of ad performance exports.
//!
//! The [`review`] module holds the rule engine and report assembly; [`run`] drives the CLI and
//! HTTP front ends around it.

mod app;
pub mod config;
pub mod error;
pub mod review;
pub mod telemetry;

pub use app::run;
