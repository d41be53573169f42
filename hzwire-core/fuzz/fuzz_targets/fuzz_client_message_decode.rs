#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use tokio_util::codec::Decoder;

use hzwire_core::codecs::{client_authentication, map_entry_listener::EntryListenerCodec};
use hzwire_core::protocol::ClientMessageCodec;

fuzz_target!(|data: &[u8]| {
    let mut codec = ClientMessageCodec::new();
    let mut buf = BytesMut::from(data);

    while let Ok(Some(msg)) = codec.decode(&mut buf) {
        let _ = msg.message_type();
        let _ = msg.correlation_id();
        let _ = msg.partition_id();
        let _ = msg.is_event();
        let _ = client_authentication::decode_response(&msg);
        for variant in [
            EntryListenerCodec::ALL,
            EntryListenerCodec::TO_KEY,
            EntryListenerCodec::WITH_PREDICATE,
            EntryListenerCodec::TO_KEY_WITH_PREDICATE,
        ] {
            let _ = variant.decode_response(&msg);
            let _ = variant.decode_event(&msg);
        }
    }
});
