//! The closed set of wire message types (spec.md §6) and their protobuf
//! shapes. Hand-written rather than `.proto`-generated: each payload type
//! derives [`prost::Message`] directly, the same shape a `prost-build`
//! invocation would produce, without a build-time codegen step.

use prost::Message;

/// The `u8` tag that precedes every framed payload. `Unknown` (0) exists
/// only to be discarded -- see [`crate::framing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Unknown = 0,
    Connect = 1,
    FrameData = 2,
    ServerFrame = 3,
    Disconnect = 4,
    GameStart = 5,
    FrameLoss = 6,
    FrameNeed = 7,
    Heartbeat = 8,
}

impl MessageType {
    /// `None` for any byte outside the closed `0..=8` set -- callers treat
    /// that as [`crate::WireError::MalformedMessage`], not `Unknown`.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(MessageType::Unknown),
            1 => Some(MessageType::Connect),
            2 => Some(MessageType::FrameData),
            3 => Some(MessageType::ServerFrame),
            4 => Some(MessageType::Disconnect),
            5 => Some(MessageType::GameStart),
            6 => Some(MessageType::FrameLoss),
            7 => Some(MessageType::FrameNeed),
            8 => Some(MessageType::Heartbeat),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// `direction` over the wire (spec.md §6): `{None, Up, Down, Left, Right,
/// UpLeft, UpRight, DownLeft, DownRight}`. A plain `i32`-backed enum rather
/// than a `prost` `oneof`, since it only ever appears as a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum WireDirection {
    #[default]
    None = 0,
    Up = 1,
    Down = 2,
    Left = 3,
    Right = 4,
    UpLeft = 5,
    UpRight = 6,
    DownLeft = 7,
    DownRight = 8,
}

impl WireDirection {
    pub fn from_i32(v: i32) -> Option<Self> {
        match v {
            0 => Some(WireDirection::None),
            1 => Some(WireDirection::Up),
            2 => Some(WireDirection::Down),
            3 => Some(WireDirection::Left),
            4 => Some(WireDirection::Right),
            5 => Some(WireDirection::UpLeft),
            6 => Some(WireDirection::UpRight),
            7 => Some(WireDirection::DownLeft),
            8 => Some(WireDirection::DownRight),
            _ => None,
        }
    }
}

/// One player's input for a single tick, as carried inside [`FrameData`]
/// and [`ServerFrame`] (spec.md §6's "Input semantics"). `fire_x`/`fire_y`
/// carry the raw `Fix64` bit pattern, not a float.
#[derive(Clone, PartialEq, Message)]
pub struct WireInput {
    #[prost(uint32, tag = "1")]
    pub player_id: u32,
    /// A [`WireDirection`] discriminant; validate with
    /// [`WireDirection::from_i32`] before trusting it.
    #[prost(int32, tag = "2")]
    pub direction: i32,
    #[prost(bool, tag = "3")]
    pub is_fire: bool,
    #[prost(sfixed64, tag = "4")]
    pub fire_x: i64,
    #[prost(sfixed64, tag = "5")]
    pub fire_y: i64,
    #[prost(bool, tag = "6")]
    pub is_toggle: bool,
}

/// Client announcing itself to the transport. Carried once per connection,
/// ahead of `GameStart`.
#[derive(Clone, PartialEq, Message)]
pub struct Connect {
    #[prost(uint32, tag = "1")]
    pub player_id: u32,
    #[prost(string, tag = "2")]
    pub room_id: String,
}

/// Client -> server: this player's input for `frame_number` (`submit_input`
/// in spec.md §6).
#[derive(Clone, PartialEq, Message)]
pub struct FrameData {
    #[prost(uint64, tag = "1")]
    pub frame_number: u64,
    #[prost(message, repeated, tag = "2")]
    pub inputs: Vec<WireInput>,
}

/// Server -> client: the authoritative input list for `frame_number`
/// (`deliver_server_frame` in spec.md §6).
#[derive(Clone, PartialEq, Message)]
pub struct ServerFrame {
    #[prost(uint64, tag = "1")]
    pub frame_number: u64,
    #[prost(message, repeated, tag = "2")]
    pub inputs: Vec<WireInput>,
}

/// Advisory notice that the sender is ending the connection.
#[derive(Clone, PartialEq, Message)]
pub struct Disconnect {
    #[prost(string, tag = "1")]
    pub reason: String,
}

/// One-shot startup envelope (`deliver_game_start` in spec.md §6): room,
/// the shared RNG seed every peer's `GameStart`-seeded components derive
/// from, and the roster of participating players.
#[derive(Clone, PartialEq, Message)]
pub struct GameStart {
    #[prost(string, tag = "1")]
    pub room_id: String,
    #[prost(uint64, tag = "2")]
    pub random_seed: u64,
    #[prost(uint32, repeated, tag = "3")]
    pub player_ids: Vec<u32>,
}

/// Client -> server: "I have nothing confirmed past `last_confirmed_frame`;
/// please resend everything after it" (`request_loss_from` in spec.md §6).
#[derive(Clone, PartialEq, Message)]
pub struct FrameLoss {
    #[prost(uint64, tag = "1")]
    pub last_confirmed_frame: u64,
}

/// Server -> client: "resend your input for frames in `[from_frame,
/// to_frame]`" -- the server-side analogue of `FrameLoss`, used when the
/// server itself is missing client input (e.g. after a reconnect).
#[derive(Clone, PartialEq, Message)]
pub struct FrameNeed {
    #[prost(uint64, tag = "1")]
    pub from_frame: u64,
    #[prost(uint64, tag = "2")]
    pub to_frame: u64,
}

/// Keepalive with no payload of its own.
#[derive(Clone, PartialEq, Message)]
pub struct Heartbeat {
    #[prost(uint64, tag = "1")]
    pub sent_at_tick: u64,
}

/// A decoded, type-tagged wire message. `Unknown` never appears here: see
/// [`crate::framing::FrameDecoder::poll_frame`].
#[derive(Clone, PartialEq, Debug)]
pub enum WireMessage {
    Connect(Connect),
    FrameData(FrameData),
    ServerFrame(ServerFrame),
    Disconnect(Disconnect),
    GameStart(GameStart),
    FrameLoss(FrameLoss),
    FrameNeed(FrameNeed),
    Heartbeat(Heartbeat),
}

impl std::fmt::Debug for Connect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connect").field("player_id", &self.player_id).field("room_id", &self.room_id).finish()
    }
}
impl std::fmt::Debug for FrameData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameData").field("frame_number", &self.frame_number).field("inputs", &self.inputs.len()).finish()
    }
}
impl std::fmt::Debug for ServerFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerFrame").field("frame_number", &self.frame_number).field("inputs", &self.inputs.len()).finish()
    }
}
impl std::fmt::Debug for Disconnect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disconnect").field("reason", &self.reason).finish()
    }
}
impl std::fmt::Debug for GameStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameStart")
            .field("room_id", &self.room_id)
            .field("random_seed", &self.random_seed)
            .field("player_ids", &self.player_ids)
            .finish()
    }
}
impl std::fmt::Debug for FrameLoss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoss").field("last_confirmed_frame", &self.last_confirmed_frame).finish()
    }
}
impl std::fmt::Debug for FrameNeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameNeed").field("from_frame", &self.from_frame).field("to_frame", &self.to_frame).finish()
    }
}
impl std::fmt::Debug for Heartbeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heartbeat").field("sent_at_tick", &self.sent_at_tick).finish()
    }
}
impl std::fmt::Debug for WireInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireInput")
            .field("player_id", &self.player_id)
            .field("direction", &self.direction)
            .field("is_fire", &self.is_fire)
            .field("is_toggle", &self.is_toggle)
            .finish()
    }
}

impl WireMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            WireMessage::Connect(_) => MessageType::Connect,
            WireMessage::FrameData(_) => MessageType::FrameData,
            WireMessage::ServerFrame(_) => MessageType::ServerFrame,
            WireMessage::Disconnect(_) => MessageType::Disconnect,
            WireMessage::GameStart(_) => MessageType::GameStart,
            WireMessage::FrameLoss(_) => MessageType::FrameLoss,
            WireMessage::FrameNeed(_) => MessageType::FrameNeed,
            WireMessage::Heartbeat(_) => MessageType::Heartbeat,
        }
    }

    pub(crate) fn encode_payload(&self) -> Vec<u8> {
        match self {
            WireMessage::Connect(m) => m.encode_to_vec(),
            WireMessage::FrameData(m) => m.encode_to_vec(),
            WireMessage::ServerFrame(m) => m.encode_to_vec(),
            WireMessage::Disconnect(m) => m.encode_to_vec(),
            WireMessage::GameStart(m) => m.encode_to_vec(),
            WireMessage::FrameLoss(m) => m.encode_to_vec(),
            WireMessage::FrameNeed(m) => m.encode_to_vec(),
            WireMessage::Heartbeat(m) => m.encode_to_vec(),
        }
    }

    pub(crate) fn decode_payload(message_type: MessageType, payload: &[u8]) -> Result<Self, crate::WireError> {
        use crate::WireError;
        Ok(match message_type {
            MessageType::Unknown => unreachable!("Unknown is handled by the framing layer before this is called"),
            MessageType::Connect => WireMessage::Connect(
                Connect::decode(payload).map_err(|source| WireError::Decode { message_type: "Connect", source })?,
            ),
            MessageType::FrameData => WireMessage::FrameData(
                FrameData::decode(payload).map_err(|source| WireError::Decode { message_type: "FrameData", source })?,
            ),
            MessageType::ServerFrame => WireMessage::ServerFrame(
                ServerFrame::decode(payload).map_err(|source| WireError::Decode { message_type: "ServerFrame", source })?,
            ),
            MessageType::Disconnect => WireMessage::Disconnect(
                Disconnect::decode(payload).map_err(|source| WireError::Decode { message_type: "Disconnect", source })?,
            ),
            MessageType::GameStart => WireMessage::GameStart(
                GameStart::decode(payload).map_err(|source| WireError::Decode { message_type: "GameStart", source })?,
            ),
            MessageType::FrameLoss => WireMessage::FrameLoss(
                FrameLoss::decode(payload).map_err(|source| WireError::Decode { message_type: "FrameLoss", source })?,
            ),
            MessageType::FrameNeed => WireMessage::FrameNeed(
                FrameNeed::decode(payload).map_err(|source| WireError::Decode { message_type: "FrameNeed", source })?,
            ),
            MessageType::Heartbeat => WireMessage::Heartbeat(
                Heartbeat::decode(payload).map_err(|source| WireError::Decode { message_type: "Heartbeat", source })?,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_type_round_trips_through_tag() {
        for mt in [
            MessageType::Unknown,
            MessageType::Connect,
            MessageType::FrameData,
            MessageType::ServerFrame,
            MessageType::Disconnect,
            MessageType::GameStart,
            MessageType::FrameLoss,
            MessageType::FrameNeed,
            MessageType::Heartbeat,
        ] {
            assert_eq!(MessageType::from_tag(mt.tag()), Some(mt));
        }
    }

    #[test]
    fn tag_outside_closed_set_is_none() {
        assert_eq!(MessageType::from_tag(9), None);
        assert_eq!(MessageType::from_tag(255), None);
    }

    #[test]
    fn wire_direction_round_trips() {
        for v in 0..=8 {
            assert!(WireDirection::from_i32(v).is_some());
        }
        assert_eq!(WireDirection::from_i32(9), None);
    }

    #[test]
    fn frame_data_encodes_and_decodes() {
        let msg = FrameData {
            frame_number: 42,
            inputs: vec![WireInput { player_id: 0, direction: WireDirection::Up as i32, is_fire: true, fire_x: 10, fire_y: -5, is_toggle: false }],
        };
        let bytes = msg.encode_to_vec();
        let decoded = FrameData::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, msg);
    }
}
