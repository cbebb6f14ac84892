//! Core types and rules for the Rollcall attendance tracker.
//!
//! - [`schedule`] resolves which classes meet on a date.
//! - [`ledger`] looks up and writes attendance, one record per subject per
//!   date.
//! - [`stats`] and [`export`] turn records into percentages, projections and
//!   a CSV report.
//! - [`catalog`] manages subject definitions and [`profile`] the student's
//!   own details.
//!
//! Persistence sits behind the [`store::RecordStore`] trait; this crate has
//! no database or terminal dependencies.

pub mod attendance;
pub mod catalog;
pub mod error;
pub mod export;
pub mod ledger;
pub mod profile;
pub mod schedule;
pub mod session;
pub mod stats;
pub mod store;
pub mod subject;

#[cfg(test)]
mod memory;

pub use error::{Error, Result};
