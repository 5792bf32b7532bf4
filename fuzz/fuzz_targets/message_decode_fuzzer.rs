//! Fuzz target for the JSON-lines lane codec
//!
//! Feeds arbitrary bytes, split at arbitrary points, through the streaming
//! decoder.
//!
//! # Invariants
//!
//! - Splitting the stream never changes what is decoded
//! - Every decoded message re-encodes and decodes to itself
//! - No buffered line grows past the length limit
//! - NEVER panic on malformed input

#![no_main]

use arbitrary::Arbitrary;
use fivepin_proto::{LineDecoder, MAX_LINE_LEN, decode_line, encode_line};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    bytes: Vec<u8>,
    split: u16,
}

fuzz_target!(|input: Input| {
    let mut whole = LineDecoder::new();
    let expected: Vec<String> = whole.push(&input.bytes).into_iter().map(|r| format!("{r:?}")).collect();

    let at = usize::from(input.split) % (input.bytes.len() + 1);
    let mut split = LineDecoder::new();
    let mut decoded = split.push(&input.bytes[..at]);
    assert!(split.pending() <= MAX_LINE_LEN);
    decoded.extend(split.push(&input.bytes[at..]));
    assert!(split.pending() <= MAX_LINE_LEN);

    let got: Vec<String> = decoded.iter().map(|r| format!("{r:?}")).collect();
    assert_eq!(got, expected, "split at {at} changed the decoded stream");

    for message in decoded.into_iter().flatten() {
        let Ok(line) = encode_line(&message) else {
            panic!("decoded message does not encode: {message:?}");
        };
        // Defaults filled in on decode can push a near-limit line over it.
        if line.len() > MAX_LINE_LEN {
            continue;
        }
        match decode_line(&line) {
            Ok(again) => assert_eq!(again, message),
            Err(e) => panic!("re-encoded message does not decode: {e}"),
        }
    }
});
