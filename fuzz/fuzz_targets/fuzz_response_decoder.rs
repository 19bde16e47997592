//! Fuzz target: `CheckInResponse::decode`
//!
//! Feeds arbitrary bytes to the streaming field decoder and asserts it
//! never panics, and that whatever decodes survives a re-encode unchanged.
//!
//! cargo fuzz run fuzz_response_decoder

#![no_main]

use catfeeder::rpc::codec::Message;
use catfeeder::rpc::messages::CheckInResponse;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(resp) = CheckInResponse::decode(data) else {
        return;
    };

    let mut again = Vec::new();
    resp.encode(&mut again).expect("Vec sink never fills");
    assert_eq!(again.len(), resp.encoded_len(), "encoded_len disagrees with encode");
    assert_eq!(CheckInResponse::decode(again.as_slice()), Ok(resp));
});
