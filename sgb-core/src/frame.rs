//! Message framing
//!
//! Every message on the wire ends with a flag block closed by the `EOF` flag:
//!
//! ```text
//! payload<|FLAG1|FLAG2|EOF|>
//! ```
//!
//! Clients send a payload with no extra flags (`restart<|EOF|>`). The listener
//! answers with an empty payload and a single status flag (`<|OK|EOF|>`).

use crate::error::{CoreError, Result};
use std::fmt;
use tokio_util::bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Full terminator appended to client payloads
pub const TERMINATOR: &str = "<|EOF|>";

/// Default cap on bytes buffered while waiting for a terminator
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 64 * 1024;

const OPEN_MARKER: &[u8] = b"<|";
const CLOSE_MARKER: &[u8] = b"|EOF|>";
const EOF_FLAG: &str = "EOF";

/// A flag carried in the flag block ahead of `EOF`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Message accepted and handed to the command router
    Ok,
    /// Sender is not on the whitelist
    Blocked,
    /// Sender did not finish the frame within the receive timeout
    Timeout,
    /// Any flag outside the listener's vocabulary
    Other(String),
}

impl Flag {
    pub fn as_str(&self) -> &str {
        match self {
            Flag::Ok => "OK",
            Flag::Blocked => "BLOCKED",
            Flag::Timeout => "TIMEOUT",
            Flag::Other(s) => s,
        }
    }
}

impl From<&str> for Flag {
    fn from(s: &str) -> Self {
        match s {
            "OK" => Flag::Ok,
            "BLOCKED" => Flag::Blocked,
            "TIMEOUT" => Flag::Timeout,
            other => Flag::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded message: payload text plus the flags preceding `EOF`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub payload: String,
    pub flags: Vec<Flag>,
}

impl Frame {
    /// A listener reply: empty payload, one flag
    pub fn reply(flag: Flag) -> Self {
        Self {
            payload: String::new(),
            flags: vec![flag],
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::with_capacity(self.payload.len() + TERMINATOR.len() + 16);
        out.push_str(&self.payload);
        out.push_str("<|");
        for flag in &self.flags {
            out.push_str(flag.as_str());
            out.push('|');
        }
        out.push_str("EOF|>");
        out.into_bytes()
    }
}

fn parse_flag(token: &[u8]) -> Result<Flag> {
    if token.is_empty() {
        return Err(CoreError::MalformedFrame("empty flag in flag block".to_string()));
    }
    if token.iter().any(|&b| b == b'<' || b == b'>') {
        return Err(CoreError::MalformedFrame(format!(
            "unbalanced marker in flag {:?}",
            String::from_utf8_lossy(token)
        )));
    }
    let text = String::from_utf8_lossy(token);
    if text == EOF_FLAG {
        return Err(CoreError::MalformedFrame(
            "EOF flag repeated before terminator".to_string(),
        ));
    }
    Ok(Flag::from(text.as_ref()))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Encode a client message, appending the terminator only when it is missing
pub fn encode(message: &str) -> Vec<u8> {
    if message.ends_with(TERMINATOR) {
        message.as_bytes().to_vec()
    } else {
        let mut out = Vec::with_capacity(message.len() + TERMINATOR.len());
        out.extend_from_slice(message.as_bytes());
        out.extend_from_slice(TERMINATOR.as_bytes());
        out
    }
}

/// Decode the first complete frame in `accumulated`
///
/// Returns `Ok(None)` while the terminator has not arrived yet. On success
/// returns the frame and the number of bytes it occupied. The flag block starts
/// at the last `<|` before the terminator, so a stray `<|` inside the payload
/// is tolerated. A `|EOF|>` with no `<|` anywhere before it is payload text and
/// scanning continues past it.
pub fn decode(accumulated: &[u8]) -> Result<Option<(Frame, usize)>> {
    let mut from = 0;
    let (open, close) = loop {
        let Some(offset) = find(&accumulated[from..], CLOSE_MARKER) else {
            return Ok(None);
        };
        let close = from + offset;

        // The `|` of `|EOF|>` may double as the `|` of `<|` when there are no flags.
        match rfind(&accumulated[..=close], OPEN_MARKER) {
            Some(open) => break (open, close),
            None => from = close + 1,
        }
    };

    let flags = if open + 1 == close {
        Vec::new()
    } else {
        accumulated[open + OPEN_MARKER.len()..close]
            .split(|&b| b == b'|')
            .map(parse_flag)
            .collect::<Result<Vec<_>>>()?
    };

    let frame = Frame {
        payload: String::from_utf8_lossy(&accumulated[..open]).into_owned(),
        flags,
    };
    Ok(Some((frame, close + CLOSE_MARKER.len())))
}

/// `tokio_util` codec for [`Frame`]s with a cap on buffered bytes
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    max_length: usize,
}

impl FrameCodec {
    pub fn with_max_length(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::with_max_length(DEFAULT_MAX_FRAME_LENGTH)
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = CoreError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        match decode(&src[..])? {
            Some((frame, consumed)) => {
                src.advance(consumed);
                Ok(Some(frame))
            }
            None if src.len() > self.max_length => Err(CoreError::FrameTooLong {
                max: self.max_length,
            }),
            None => Ok(None),
        }
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = CoreError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(&item.to_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_terminators(bytes: &[u8]) -> usize {
        bytes
            .windows(TERMINATOR.len())
            .filter(|w| *w == TERMINATOR.as_bytes())
            .count()
    }

    #[test]
    fn test_encode_appends_terminator() {
        assert_eq!(encode("hello"), b"hello<|EOF|>".to_vec());
    }

    #[test]
    fn test_encode_is_idempotent() {
        let once = encode("hi");
        let twice = encode(std::str::from_utf8(&once).unwrap());
        assert_eq!(once, twice);
        assert_eq!(count_terminators(&twice), 1);
    }

    #[test]
    fn test_decode_client_frame() {
        let (frame, consumed) = decode(&encode("hello")).unwrap().unwrap();
        assert_eq!(frame.payload, "hello");
        assert!(frame.flags.is_empty());
        assert_eq!(consumed, "hello<|EOF|>".len());
    }

    #[test]
    fn test_decode_server_reply() {
        let (frame, _) = decode(b"<|BLOCKED|EOF|>").unwrap().unwrap();
        assert_eq!(frame.payload, "");
        assert_eq!(frame.flags, vec![Flag::Blocked]);
    }

    #[test]
    fn test_decode_preserves_flag_order() {
        let (frame, _) = decode(b"msg<|B|A|TIMEOUT|EOF|>").unwrap().unwrap();
        assert_eq!(frame.payload, "msg");
        assert_eq!(
            frame.flags,
            vec![
                Flag::Other("B".to_string()),
                Flag::Other("A".to_string()),
                Flag::Timeout
            ]
        );
    }

    #[test]
    fn test_decode_incomplete_returns_none() {
        assert!(decode(b"").unwrap().is_none());
        assert!(decode(b"hello").unwrap().is_none());
        assert!(decode(b"hello<|EO").unwrap().is_none());
    }

    #[test]
    fn test_decode_reports_consumed_offset() {
        let (frame, consumed) = decode(b"one<|EOF|>two").unwrap().unwrap();
        assert_eq!(frame.payload, "one");
        assert_eq!(consumed, 10);
    }

    #[test]
    fn test_decode_rejects_unbalanced_markers() {
        for bad in [
            &b"<||EOF|>"[..],
            &b"x<|A>|EOF|>"[..],
            &b"<|EOF|EOF|>"[..],
        ] {
            assert!(
                matches!(decode(bad), Err(CoreError::MalformedFrame(_))),
                "expected {:?} to be rejected",
                String::from_utf8_lossy(bad)
            );
        }
    }

    #[test]
    fn test_reply_wire_form() {
        assert_eq!(Frame::reply(Flag::Ok).to_bytes(), b"<|OK|EOF|>".to_vec());
        assert_eq!(Frame::reply(Flag::Timeout).to_bytes(), b"<|TIMEOUT|EOF|>".to_vec());
    }

    #[test]
    fn test_terminator_lookalike_in_payload() {
        let (frame, consumed) = decode(&encode("x|EOF|>y")).unwrap().unwrap();
        assert_eq!(frame.payload, "x|EOF|>y");
        assert!(frame.flags.is_empty());
        assert_eq!(consumed, "x|EOF|>y<|EOF|>".len());

        // Still waiting for the real terminator
        assert!(decode(b"hello|EOF|>").unwrap().is_none());
    }

    #[test]
    fn test_stray_open_marker_in_payload() {
        let (frame, _) = decode(&encode("a<|b")).unwrap().unwrap();
        assert_eq!(frame.payload, "a<|b");
        assert!(frame.flags.is_empty());
    }

    #[test]
    fn test_utf8_payload() {
        let (frame, _) = decode(&encode("olá mundo")).unwrap().unwrap();
        assert_eq!(frame.payload, "olá mundo");
    }

    #[test]
    fn test_codec_decodes_across_chunks() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&b"rest"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"art<|EOF|>");
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame.payload, "restart");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_codec_caps_unterminated_input() {
        let mut codec = FrameCodec::with_max_length(8);
        let mut buf = BytesMut::from(&b"0123456789"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CoreError::FrameTooLong { max: 8 })
        ));
    }

    #[test]
    fn test_codec_encodes_frames() {
        let mut codec = FrameCodec::default();
        let mut dst = BytesMut::new();
        codec.encode(Frame::reply(Flag::Blocked), &mut dst).unwrap();
        assert_eq!(&dst[..], b"<|BLOCKED|EOF|>");
    }
}
