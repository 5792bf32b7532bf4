//! JSON-lines codec.
//!
//! One message per line, UTF-8 JSON, terminated by `\n`. Lines longer than
//! [`MAX_LINE_LEN`] are rejected before parsing.

use crate::{error::ProtocolError, message::LaneMessage};

/// Longest accepted line, excluding the terminator.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Serializes `message` as one newline-terminated line.
pub fn encode_line(message: &LaneMessage) -> Result<Vec<u8>, ProtocolError> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    Ok(line)
}

/// Parses one line (terminator optional).
pub fn decode_line(line: &[u8]) -> Result<LaneMessage, ProtocolError> {
    let trimmed = line.trim_ascii();
    if trimmed.is_empty() {
        return Err(ProtocolError::EmptyLine);
    }
    if trimmed.len() > MAX_LINE_LEN {
        return Err(ProtocolError::LineTooLong { len: trimmed.len(), max: MAX_LINE_LEN });
    }
    Ok(serde_json::from_slice(trimmed)?)
}

/// Splits a byte stream into messages.
///
/// Bytes after the last newline are kept until more data arrives. A partial
/// line that grows past [`MAX_LINE_LEN`] is discarded and reported once.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
    discarding: bool,
}

impl LineDecoder {
    /// Empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds bytes and returns every complete line decoded. Blank lines are
    /// skipped.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<LaneMessage, ProtocolError>> {
        let mut out = Vec::new();

        for &byte in bytes {
            if byte == b'\n' {
                let line = std::mem::take(&mut self.buffer);
                if std::mem::take(&mut self.discarding) {
                    continue;
                }
                if !line.trim_ascii().is_empty() {
                    out.push(decode_line(&line));
                }
                continue;
            }

            if self.discarding {
                continue;
            }
            self.buffer.push(byte);
            if self.buffer.len() > MAX_LINE_LEN {
                out.push(Err(ProtocolError::LineTooLong { len: self.buffer.len(), max: MAX_LINE_LEN }));
                self.buffer.clear();
                self.discarding = true;
            }
        }

        out
    }

    /// Bytes waiting for a terminator.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use fivepin_core::{BowlerEntry, GameLimit, GameSettings, PinVector};

    use super::*;

    #[test]
    fn line_round_trip() {
        let message = LaneMessage::ScoreCorrection {
            bowler: 1,
            frame: 4,
            balls: vec!["11000".parse().unwrap(), "00111".parse().unwrap()],
        };
        let line = encode_line(&message).unwrap();
        assert_eq!(line.last(), Some(&b'\n'));
        assert_eq!(decode_line(&line).unwrap(), message);
    }

    #[test]
    fn schedule_reset_wire_shape() {
        let line = encode_line(&LaneMessage::ScheduleReset { immediate: true }).unwrap();
        insta::assert_snapshot!(String::from_utf8(line).unwrap().trim_end(), @r#"{"type":"schedule_reset","immediate":true}"#);
    }

    #[test]
    fn decodes_desk_messages_with_defaults() {
        let message = decode_line(br#"{"type":"quick_game","bowlers":[{"name":"Ann"},{"name":"Bo","handicap":12}],"limit":{"games":3}}"#)
            .unwrap();
        assert_eq!(
            message,
            LaneMessage::QuickGame {
                bowlers: vec![BowlerEntry::new("Ann"), BowlerEntry { name: "Bo".to_string(), handicap: 12 }],
                limit: GameLimit::Games(3),
                settings: GameSettings::default(),
            }
        );
        assert_eq!(decode_line(br#"{"type":"throw"}"#).unwrap(), LaneMessage::Throw { pins: None });
        assert_eq!(
            decode_line(br#"{"type":"throw","pins":"11111"}"#).unwrap(),
            LaneMessage::Throw { pins: Some(PinVector::ALL) }
        );
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(matches!(decode_line(b"  \n"), Err(ProtocolError::EmptyLine)));
        assert!(matches!(decode_line(b"{\"type\":\"warp\"}"), Err(ProtocolError::Json(_))));
        assert!(matches!(decode_line(br#"{"type":"pin_set","pins":"11"}"#), Err(ProtocolError::Json(_))));
        let long = vec![b' '; MAX_LINE_LEN + 10];
        let mut long_line = b"{\"type\":\"ping\"}".to_vec();
        long_line.extend_from_slice(&long);
        long_line.insert(0, b'x');
        assert!(decode_line(&long_line).is_err());
    }

    #[test]
    fn decoder_handles_split_lines() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"{\"type\":\"pi").is_empty());
        assert_eq!(decoder.pending(), 11);

        let out = decoder.push(b"ng\"}\n\n{\"type\":\"pong\"}\n");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().unwrap(), &LaneMessage::Ping);
        assert_eq!(out[1].as_ref().unwrap(), &LaneMessage::Pong);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn decoder_discards_oversized_line() {
        let mut decoder = LineDecoder::new();
        let out = decoder.push(&vec![b'a'; MAX_LINE_LEN + 1]);
        assert!(matches!(out.as_slice(), [Err(ProtocolError::LineTooLong { .. })]));

        let out = decoder.push(b"aaaa\n{\"type\":\"ping\"}\n");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_ref().unwrap(), &LaneMessage::Ping);
    }
}
