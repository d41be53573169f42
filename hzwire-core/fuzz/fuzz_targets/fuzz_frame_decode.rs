#![no_main]

use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;

use hzwire_core::protocol::Frame;

fuzz_target!(|data: &[u8]| {
    let mut buf = BytesMut::from(data);

    while let Ok(Some(frame)) = Frame::read_from(&mut buf) {
        let _ = frame.is_begin_frame();
        let _ = frame.is_end_frame();
        let _ = frame.is_null_frame();
        let _ = frame.is_unfragmented();
        let _ = frame.read_int_at(0);
        let _ = frame.read_guid_at(4);
        assert!(frame.wire_size() >= 6);
    }
});
