//! Property-based tests for the JSON-lines codec.
//!
//! Lane commands and signals are generated at random and pushed through the
//! stream decoder in arbitrary chunks.

use fivepin_core::PinVector;
use fivepin_proto::{LaneMessage, LineDecoder, decode_line, encode_line};
use proptest::prelude::*;

fn pins() -> impl Strategy<Value = PinVector> {
    (0u8..32).prop_map(PinVector::from_mask)
}

/// Messages without nested setups; enough to cover every framing path.
fn message() -> impl Strategy<Value = LaneMessage> {
    let leaf = prop_oneof![
        prop::option::of(pins()).prop_map(|pins| LaneMessage::Throw { pins }),
        any::<bool>().prop_map(|immediate| LaneMessage::ScheduleReset { immediate }),
        pins().prop_map(|pins| LaneMessage::PinRestore { pins }),
        pins().prop_map(|pins| LaneMessage::PinSet { pins }),
        Just(LaneMessage::EmergencyReset),
        (0usize..6, 0usize..10, prop::collection::vec(pins(), 0..4))
            .prop_map(|(bowler, frame, balls)| LaneMessage::ScoreCorrection { bowler, frame, balls }),
        Just(LaneMessage::ToggleHold),
        "[ -~]{0,40}".prop_map(|reason| LaneMessage::EndGameRequest { reason }),
        Just(LaneMessage::RequestMachineStatus),
        (any::<u16>(), any::<u64>()).prop_map(|(lane_id, timestamp)| LaneMessage::Heartbeat { lane_id, timestamp }),
        (any::<u16>(), any::<u32>()).prop_map(|(lane_id, game_number)| LaneMessage::GameComplete { lane_id, game_number }),
        Just(LaneMessage::Ping),
        Just(LaneMessage::Pong),
    ];
    leaf.prop_flat_map(|inner| {
        prop_oneof![
            Just(inner.clone()),
            any::<u16>().prop_map(move |lane_id| LaneMessage::LaneCommand { lane_id, command: Box::new(inner.clone()) }),
        ]
    })
}

proptest! {
    /// Property: every encoded message decodes back to itself
    #[test]
    fn prop_line_round_trip(message in message()) {
        let line = encode_line(&message).unwrap();
        prop_assert_eq!(line.iter().filter(|&&b| b == b'\n').count(), 1);
        prop_assert_eq!(decode_line(&line).unwrap(), message);
    }

    /// Property: how the byte stream is chunked never changes what is decoded
    #[test]
    fn prop_chunking_is_invisible(
        messages in prop::collection::vec(message(), 1..12),
        chunk in 1usize..64,
    ) {
        let stream: Vec<u8> = messages.iter().flat_map(|m| encode_line(m).unwrap()).collect();

        let mut decoder = LineDecoder::new();
        let mut decoded = Vec::new();
        for piece in stream.chunks(chunk) {
            decoded.extend(decoder.push(piece).into_iter().map(Result::unwrap));
        }

        prop_assert_eq!(decoded, messages);
        prop_assert_eq!(decoder.pending(), 0);
    }
}
