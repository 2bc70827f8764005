//! Length-prefixed, tagged framing over a byte stream (spec.md §6).
//!
//! Each frame on the wire is `u32` big-endian length (the byte count of
//! the tag plus payload that follows), one `u8` message-type tag, then the
//! `prost`-encoded payload. [`FrameDecoder`] is an incremental decoder:
//! feed it bytes as they arrive and call [`FrameDecoder::poll_frame`]
//! until it returns `Ok(None)` (not enough bytes buffered yet).

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::message::{MessageType, WireMessage};
use crate::WireError;

/// Total length (tag + payload) a single frame may declare. A length
/// prefix larger than this is `MalformedMessage`, never read into memory.
pub const MAX_FRAME_LEN: u32 = 1024 * 1024;

const LENGTH_PREFIX_BYTES: usize = 4;

/// The result of successfully pulling one frame off the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A recognised, decoded message.
    Message(WireMessage),
    /// An `Unknown`-tagged frame. Its payload was read and discarded; the
    /// stream remains aligned on the next frame.
    Unknown,
}

/// Encode one message as a complete frame: length prefix, tag, payload.
pub fn encode_frame(message: &WireMessage) -> Result<Bytes, WireError> {
    let payload = message.encode_payload();
    let total_len = 1 + payload.len();
    if total_len > MAX_FRAME_LEN as usize {
        return Err(WireError::MalformedMessage(format!(
            "encoded frame of {total_len} bytes exceeds the {MAX_FRAME_LEN}-byte cap"
        )));
    }

    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX_BYTES + total_len);
    buf.put_u32(total_len as u32);
    buf.put_u8(message.message_type().tag());
    buf.put_slice(&payload);
    Ok(buf.freeze())
}

/// An incremental length-prefixed frame reader over an accumulating byte
/// buffer (e.g. bytes read off a socket as they arrive).
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        FrameDecoder { buffer: BytesMut::new() }
    }

    /// Append newly-received bytes to the internal buffer.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Try to pull one frame out of the buffered bytes.
    ///
    /// Returns `Ok(None)` when fewer bytes than the next frame needs are
    /// buffered so far -- call again after `push_bytes`. An `Unknown`-typed
    /// frame is consumed and reported as [`Frame::Unknown`] rather than
    /// silently skipped, so a caller that wants visibility into discarded
    /// traffic can log it; the stream stays aligned either way.
    pub fn poll_frame(&mut self) -> Result<Option<Frame>, WireError> {
        if self.buffer.len() < LENGTH_PREFIX_BYTES {
            return Ok(None);
        }

        let declared_len = u32::from_be_bytes(self.buffer[..LENGTH_PREFIX_BYTES].try_into().expect("checked len"));
        if declared_len == 0 {
            return Err(WireError::StreamDesynchronised);
        }
        if declared_len > MAX_FRAME_LEN {
            return Err(WireError::MalformedMessage(format!(
                "declared frame length {declared_len} exceeds the {MAX_FRAME_LEN}-byte cap"
            )));
        }

        let frame_total = LENGTH_PREFIX_BYTES + declared_len as usize;
        if self.buffer.len() < frame_total {
            return Ok(None);
        }

        self.buffer.advance(LENGTH_PREFIX_BYTES);
        let mut frame_bytes = self.buffer.split_to(declared_len as usize);

        let tag = frame_bytes.get_u8();
        let Some(message_type) = MessageType::from_tag(tag) else {
            return Err(WireError::MalformedMessage(format!("tag {tag} is outside the closed message-type set")));
        };

        if message_type == MessageType::Unknown {
            return Ok(Some(Frame::Unknown));
        }

        let message = WireMessage::decode_payload(message_type, &frame_bytes)?;
        Ok(Some(Frame::Message(message)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{FrameLoss, Heartbeat};

    #[test]
    fn encode_then_decode_round_trips() {
        let msg = WireMessage::Heartbeat(Heartbeat { sent_at_tick: 7 });
        let bytes = encode_frame(&msg).unwrap();

        let mut decoder = FrameDecoder::new();
        decoder.push_bytes(&bytes);
        let decoded = decoder.poll_frame().unwrap().unwrap();
        assert_eq!(decoded, Frame::Message(msg));
    }

    #[test]
    fn partial_bytes_yield_none_until_complete() {
        let msg = WireMessage::FrameLoss(FrameLoss { last_confirmed_frame: 4 });
        let bytes = encode_frame(&msg).unwrap();

        let mut decoder = FrameDecoder::new();
        decoder.push_bytes(&bytes[..bytes.len() - 1]);
        assert_eq!(decoder.poll_frame().unwrap(), None);

        decoder.push_bytes(&bytes[bytes.len() - 1..]);
        assert_eq!(decoder.poll_frame().unwrap(), Some(Frame::Message(msg)));
    }

    #[test]
    fn two_frames_back_to_back_both_decode() {
        let a = WireMessage::Heartbeat(Heartbeat { sent_at_tick: 1 });
        let b = WireMessage::Heartbeat(Heartbeat { sent_at_tick: 2 });

        let mut decoder = FrameDecoder::new();
        decoder.push_bytes(&encode_frame(&a).unwrap());
        decoder.push_bytes(&encode_frame(&b).unwrap());

        assert_eq!(decoder.poll_frame().unwrap(), Some(Frame::Message(a)));
        assert_eq!(decoder.poll_frame().unwrap(), Some(Frame::Message(b)));
        assert_eq!(decoder.poll_frame().unwrap(), None);
    }

    #[test]
    fn unknown_tag_is_discarded_without_desyncing() {
        let mut buf = BytesMut::new();
        buf.put_u32(1);
        buf.put_u8(0); // Unknown
        let mut after = BytesMut::new();
        after.extend_from_slice(&buf);
        after.extend_from_slice(&encode_frame(&WireMessage::Heartbeat(Heartbeat { sent_at_tick: 9 })).unwrap());

        let mut decoder = FrameDecoder::new();
        decoder.push_bytes(&after);
        assert_eq!(decoder.poll_frame().unwrap(), Some(Frame::Unknown));
        assert_eq!(
            decoder.poll_frame().unwrap(),
            Some(Frame::Message(WireMessage::Heartbeat(Heartbeat { sent_at_tick: 9 })))
        );
    }

    #[test]
    fn declared_length_over_cap_is_malformed() {
        let mut buf = BytesMut::new();
        buf.put_u32(MAX_FRAME_LEN + 1);
        let mut decoder = FrameDecoder::new();
        decoder.push_bytes(&buf);
        assert!(matches!(decoder.poll_frame(), Err(WireError::MalformedMessage(_))));
    }

    #[test]
    fn tag_outside_closed_set_is_malformed() {
        let mut buf = BytesMut::new();
        buf.put_u32(1);
        buf.put_u8(200);
        let mut decoder = FrameDecoder::new();
        decoder.push_bytes(&buf);
        assert!(matches!(decoder.poll_frame(), Err(WireError::MalformedMessage(_))));
    }
}
