#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = inflate_zlib::DeflateDecoder::new(data);
    let _result = decoder.decode_zlib();
});
