// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # airpage - POCSAG paging transmitter core
//!
//! A pure Rust implementation of the POCSAG (ITU-R M.584) paging protocol
//! encoder and the transmission pipeline that carries messages from an
//! application to a software-defined radio front end.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use airpage::{
//!     build_encoder, sdr, Config, DeviceMonitor, MemoryStore, MessageType, NullSink,
//!     SystemStatus, TransmissionQueue, TransmissionRequest, TransmissionWorker,
//!     DEFAULT_CHECK_INTERVAL,
//! };
//!
//! fn main() -> airpage::Result<()> {
//!     let config = Config::default();
//!     config.validate()?;
//!
//!     let queue = Arc::new(TransmissionQueue::new());
//!     let status = Arc::new(SystemStatus::new());
//!     let driver = sdr::shared(sdr::build_driver(config.registry.driver)?);
//!
//!     let worker = TransmissionWorker::start(
//!         Arc::clone(&queue),
//!         build_encoder(&config),
//!         Arc::clone(&driver),
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(NullSink),
//!         Arc::clone(&status),
//!         config.clone(),
//!     );
//!     let monitor = DeviceMonitor::start(
//!         driver,
//!         Arc::clone(&queue),
//!         status,
//!         Arc::new(NullSink),
//!         config,
//!         DEFAULT_CHECK_INTERVAL,
//!     );
//!
//!     worker.submit(TransmissionRequest::new(
//!         1,
//!         vec!["1234567".into()],
//!         "TEST",
//!         MessageType::Alphanumeric,
//!         439.9875,
//!         1200,
//!     )?)?;
//!
//!     worker.stop();
//!     monitor.stop();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------------+
//! |                        Application Layer                           |
//! |        submit() -> TransmissionQueue <- pause/resume               |
//! +--------------------------------------------------------------------+
//! |                        Pipeline Layer                              |
//! |   TransmissionWorker (state machine) | DeviceMonitor (health)      |
//! +--------------------------------------------------------------------+
//! |                        Encoding Layer                              |
//! |   codewords + BCH(31,21) -> batches -> bitstream -> 2-FSK IQ       |
//! +--------------------------------------------------------------------+
//! |                        Driver Layer                                |
//! |   SdrDriver trait | NoopSdr | external hardware | subprocess path  |
//! +--------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TransmissionRequest`] | Validated message addressed to one or more RICs |
//! | [`TransmissionWorker`] | Background task driving encode, configure, transmit |
//! | [`TransmissionQueue`] | FIFO between producers and the worker |
//! | [`DeviceMonitor`] | Periodic radio health probe with auto-recovery |
//! | [`BasebandEncoder`] | Bit-exact POCSAG encoder producing IQ samples |
//! | [`SdrDriver`] | Operations the pipeline requires from a radio |
//!
//! ## Modules Overview
//!
//! - [`pocsag`] - protocol encoding (codewords, batches, FEC)
//! - [`fsk`] - 2-FSK modulation to complex IQ samples
//! - [`worker`] - the transmission state machine
//! - [`monitor`] - radio health and queue recovery
//! - [`sdr`] - driver seam and bundled variants
//! - [`store`] / [`events`] - persistence and event sinks

/// Runtime configuration tree with defaults and validation.
pub mod config;
/// Encoder seam and variant registry.
pub mod encoder;
/// Error types shared across the pipeline.
pub mod error;
/// Lifecycle event publication.
pub mod events;
/// 2-FSK modulation of bitstreams into IQ samples.
pub mod fsk;
/// Periodic radio health monitoring.
pub mod monitor;
/// POCSAG codeword, batch, and transmission encoding.
pub mod pocsag;
/// FIFO queue feeding the worker.
pub mod queue;
/// Transmission request records and validation.
pub mod request;
/// Radio driver seam and bundled driver variants.
pub mod sdr;
/// Shared system status registry.
pub mod status;
/// Persistence seams and the in-memory store.
pub mod store;
/// Background transmission worker.
pub mod worker;

pub use config::{Config, PocsagConfig, RegistryConfig, SubprocessConfig, SystemConfig};
pub use encoder::{build_encoder, EncoderSelection, MessageEncoder};
pub use error::{Error, Result};
pub use events::{ChannelSink, Event, EventSink, NullSink};
pub use fsk::FskModulator;
pub use monitor::{DeviceMonitor, DEFAULT_CHECK_INTERVAL};
pub use pocsag::BasebandEncoder;
pub use queue::TransmissionQueue;
pub use request::{MessageType, TransmissionRequest};
pub use sdr::{DriverSelection, NoopSdr, SdrDriver, SubprocessEncoder};
pub use status::{StatusSnapshot, SystemStatus};
pub use store::{MemoryStore, Store, StoreSession};
pub use worker::{RequestState, TransmissionWorker};

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
