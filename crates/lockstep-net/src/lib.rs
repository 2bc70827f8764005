//! lockstep-net -- client-authoritative prediction with server
//! reconciliation, built on [`lockstep_sim`]'s pipeline and [`lockstep_ecs`]'s
//! world (spec.md §4.5, §5, §6).
//!
//! This crate owns the double-world controller and the small traits a
//! transport implements to talk to it; it does not itself open a socket
//! or speak the wire format (that is `lockstep-wire`, consumed by a host
//! implementing [`transport::TransportAdapter`]/[`transport::TransportSink`]
//! over it).
//!
//! # Quick Start
//!
//! ```
//! use lockstep_ecs::components::GridMap;
//! use lockstep_ecs::world::World;
//! use lockstep_fixed::Fix64;
//! use lockstep_net::{PredictionController, TransportAdapter, TransportSink};
//! use lockstep_sim::pipeline::Pipeline;
//! use std::collections::BTreeSet;
//!
//! struct NullTransport;
//! impl TransportAdapter for NullTransport {
//!     fn submit_input(&mut self, _frame_number: u64, _inputs: &lockstep_sim::input::FrameData) {}
//!     fn request_loss_from(&mut self, _confirmed_frame: u64) {}
//!     fn emit_disconnect(&mut self) {}
//! }
//!
//! let grid = GridMap { width: 8, height: 8, cell_size: Fix64::ONE, obstacles: BTreeSet::new() };
//! let mut controller = PredictionController::new(World::new(grid), Pipeline::new(), NullTransport, 64);
//! controller.run_tick(vec![]);
//! assert_eq!(controller.predicted_frame(), 1);
//! ```

#![deny(unsafe_code)]

pub mod classification;
pub mod controller;
pub mod error;
pub mod mailbox;
pub mod transport;

pub use classification::{classify, FrameClassification};
pub use controller::{PredictionController, TickReport};
pub use error::NetError;
pub use mailbox::Mailbox;
pub use transport::{TransportAdapter, TransportSink};

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::{
        classify, FrameClassification, Mailbox, NetError, PredictionController, TickReport,
        TransportAdapter, TransportSink,
    };
}
