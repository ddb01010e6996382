#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Same input, but with an output size cap, to exercise the
    // `OutputLimitExceeded` path alongside every other failure mode.
    let options = inflate_zlib::DeflateOptions::default().set_limit(1 << 20);
    let mut decoder = inflate_zlib::DeflateDecoder::new_with_options(data, options);
    let _result = decoder.decode_zlib();
});
