//! The two trait boundaries between the prediction controller and an
//! external transport (spec.md §6).
//!
//! [`TransportAdapter`] is outbound: the controller holds one and calls it
//! to push data *out* (`submit_input`, `request_loss_from`,
//! `emit_disconnect`). [`TransportSink`] is inbound: the controller
//! implements it, and the host (driving bytes off a socket through
//! `lockstep-wire`) calls into the controller to push data *in*
//! (`deliver_server_frame`, `deliver_game_start`, `deliver_late_frames`).
//! Splitting the two keeps the controller's dependency on "the transport"
//! to a single small trait, while its own inbound surface is just
//! ordinary methods any host can call -- TCP, UDP, and KCP transports are
//! equivalent collaborators behind this boundary (spec.md §9).

use lockstep_sim::input::FrameData;

/// Outbound operations the controller performs against the transport.
pub trait TransportAdapter {
    /// This client's input for `frame_number`, to be submitted for server
    /// acceptance.
    fn submit_input(&mut self, frame_number: u64, inputs: &FrameData);

    /// Ask the server to resend every frame strictly after
    /// `confirmed_frame`.
    fn request_loss_from(&mut self, confirmed_frame: u64);

    /// Advisory: this peer is ending the session.
    fn emit_disconnect(&mut self);
}

/// Inbound operations the host drives against the controller.
pub trait TransportSink {
    /// Deliver one authoritative server frame for classification.
    fn deliver_server_frame(&mut self, frame_number: u64, inputs: FrameData);

    /// One-shot startup envelope: room, shared seed, and player roster.
    fn deliver_game_start(&mut self, room_id: String, random_seed: u64, player_ids: Vec<u8>);

    /// A batch of frames delivered after a `FrameLoss` recovery round-trip.
    fn deliver_late_frames(&mut self, frames: Vec<(u64, FrameData)>);
}
