//! lockstep-wire -- the wire message types and length-prefixed framing
//! spec.md §6 defines as the boundary between the simulation core and an
//! external transport.
//!
//! This crate owns only the *shape* of messages on the wire and how they
//! are framed; it has no socket, no async runtime, and no opinion about
//! TCP vs UDP vs KCP (spec.md §9, "transport variants"). [`lockstep_net`]
//! is the layer that interprets these messages against a running
//! simulation.
//!
//! # Quick Start
//!
//! ```
//! use lockstep_wire::{encode_frame, Frame, FrameDecoder, Heartbeat, WireMessage};
//!
//! let outgoing = WireMessage::Heartbeat(Heartbeat { sent_at_tick: 100 });
//! let bytes = encode_frame(&outgoing).unwrap();
//!
//! let mut decoder = FrameDecoder::new();
//! decoder.push_bytes(&bytes);
//! assert_eq!(decoder.poll_frame().unwrap(), Some(Frame::Message(outgoing)));
//! ```

#![deny(unsafe_code)]

pub mod error;
pub mod framing;
pub mod message;

pub use error::WireError;
pub use framing::{encode_frame, Frame, FrameDecoder, MAX_FRAME_LEN};
pub use message::{
    Connect, Disconnect, FrameData, FrameLoss, FrameNeed, GameStart, Heartbeat, MessageType,
    ServerFrame, WireDirection, WireInput, WireMessage,
};

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::{
        encode_frame, Connect, Disconnect, Frame, FrameData, FrameDecoder, FrameLoss, FrameNeed,
        GameStart, Heartbeat, MessageType, ServerFrame, WireDirection, WireError, WireInput,
        WireMessage,
    };
}
