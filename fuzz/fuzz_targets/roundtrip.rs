#![no_main]

use std::io::Write;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let orig_len = data.len();

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    let compressed = encoder.finish().unwrap();

    let options = inflate_zlib::DeflateOptions::default().set_limit(orig_len);
    let mut decoder = inflate_zlib::DeflateDecoder::new_with_options(&compressed, options);
    let decoded = decoder
        .decode_zlib()
        .expect("failed to decompress a stream we just compressed ourselves");

    assert!(
        data == decoded,
        "the decompressed data doesn't match the original data!"
    );
});
