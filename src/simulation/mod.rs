//! WLAN contention simulation core module.
//!
//! This module provides the discrete-event infrastructure and the models of a
//! single-cell wireless network. It integrates:
//! - A virtual clock with a time-ordered event queue
//! - Stations that back off and then evaluate their radio link
//! - An access point that serializes accepted packets through a FIFO queue
//! - A packet generator that creates stations at fixed intervals
//!
//! ## Module Organization
//!
//! - `scheduler`: Virtual clock, event queue and process table
//! - `process`: The resumable process abstraction
//! - `types`: Errors, requests and trace records
//! - `geometry`: Points and distances
//! - `signal_calculations`: Path loss, shadowing and link decision
//! - `station`, `access_point`, `generator`: The simulated entities
//! - `network`: The shared world and a complete run
//! - `report`: End-of-run summary
//!
//! ## Public API
//!
//! The main entry point is [`run_simulation`], which validates a
//! configuration, runs it to its horizon and returns a [`report::SimulationReport`].

pub mod access_point;
pub mod generator;
pub mod geometry;
pub mod network;
pub mod process;
pub mod report;
pub mod scheduler;
pub mod signal_calculations;
pub mod station;
pub mod types;

pub(crate) use network::run_simulation;
