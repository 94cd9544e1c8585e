// This suite validates:
//
// * known-answer vectors through the public callback contract
// * asynchronous, exactly-once completion
// * IV reuse across independent calls
// * the always-software `Decrypter`

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use decrypter_core::prelude::*;

    // the string "howdy folks" encrypted
    const HOWDY: [u8; 16] = [
        0xce, 0x90, 0x97, 0xd0, 0x08, 0x46, 0x4d, 0x18,
        0x4f, 0xae, 0x01, 0x1c, 0x82, 0xa8, 0xf0, 0x67,
    ];

    // the string "0123456789abcdef01234" encrypted
    const CBC_BLOCKS: [u8; 32] = [
        0x14, 0xf5, 0xfe, 0x74, 0x69, 0x66, 0xf2, 0x92,
        0x65, 0x1c, 0x22, 0x88, 0xbb, 0xff, 0x46, 0x09,
        0x0b, 0xde, 0x5e, 0x71, 0x77, 0x87, 0xeb, 0x84,
        0xa9, 0x54, 0xc2, 0x45, 0xe9, 0x4e, 0x29, 0xb3,
    ];

    const KEY: [u8; 16] = [0u8; 16];
    const IV: [u32; 4] = [0u32; 4];

    type Slot = Arc<Mutex<Vec<DecryptResult>>>;

    fn collector() -> (Slot, impl FnOnce(DecryptResult) + Send + 'static) {
        let slot: Slot = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&slot);
        (slot, move |res| sink.lock().unwrap().push(res))
    }

    fn stream() -> AsyncStream {
        AsyncStream::with_delay(Duration::ZERO)
    }

    #[test]
    fn decrypts_a_single_pkcs7_block() {
        let stream = stream();
        let (slot, done) = collector();

        decrypt(&stream.handle(), HOWDY.to_vec(), &KEY, &IV, done);
        stream.run_until_idle();

        let results = slot.lock().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].as_deref(), Ok(&b"howdy folks"[..]));
    }

    #[test]
    fn decrypts_multiple_blocks_with_cbc() {
        let stream = stream();
        let (slot, done) = collector();

        decrypt(&stream.handle(), CBC_BLOCKS.to_vec(), &KEY, &IV, done);
        stream.run_until_idle();

        let results = slot.lock().unwrap();
        assert_eq!(results[0].as_deref(), Ok(&b"0123456789abcdef01234"[..]));
    }

    #[test]
    fn completion_is_never_synchronous() {
        let stream = stream();
        let (slot, done) = collector();

        let handle = decrypt(&stream.handle(), HOWDY.to_vec(), &KEY, &IV, done);
        assert!(!handle.is_finished());
        assert!(slot.lock().unwrap().is_empty());

        stream.run_until_idle();
        assert!(handle.is_finished());
    }

    #[test]
    fn two_decrypts_sharing_one_iv_are_independent() {
        let stream = stream();
        let iv = IV;
        let (first, done_a) = collector();
        let (second, done_b) = collector();

        decrypt(&stream.handle(), HOWDY.to_vec(), &KEY, &iv, done_a);
        decrypt(&stream.handle(), HOWDY.to_vec(), &KEY, &iv, done_b);
        stream.run_until_idle();

        let a = first.lock().unwrap()[0].clone().unwrap();
        let b = second.lock().unwrap()[0].clone().unwrap();
        assert_eq!(a, b"howdy folks");
        assert_eq!(a, b);
        assert_eq!(iv, IV);
    }

    #[test]
    fn interleaved_vectors_in_one_stream() {
        let stream = stream();
        let (howdy, done_a) = collector();
        let (blocks, done_b) = collector();

        Decrypter::new(&stream.handle(), HOWDY.to_vec(), &KEY, &IV, done_a);
        Decrypter::new(&stream.handle(), CBC_BLOCKS.to_vec(), &KEY, &IV, done_b);
        stream.run_until_idle();

        assert_eq!(howdy.lock().unwrap()[0].as_deref(), Ok(&b"howdy folks"[..]));
        assert_eq!(blocks.lock().unwrap()[0].as_deref(), Ok(&b"0123456789abcdef01234"[..]));
    }

    #[test]
    fn decrypter_always_uses_software_path() {
        let stream = stream();
        let (slot, done) = collector();

        let decrypter = Decrypter::new(&stream.handle(), HOWDY.to_vec(), &KEY, &IV, done);
        assert!(stream.tick());
        assert!(decrypter.is_finished());

        let snapshot = decrypter.handle().telemetry().unwrap();
        assert_eq!(snapshot.path, DecryptPath::Software);
        assert_eq!(snapshot.counters.chunks, 1);
        assert_eq!(snapshot.counters.bytes_plaintext, 11);
        assert_eq!(snapshot.counters.bytes_padding, 5);
        assert!(snapshot.sanity_check());
        assert_eq!(slot.lock().unwrap()[0].as_deref(), Ok(&b"howdy folks"[..]));
    }

    #[test]
    fn key_can_be_parsed_from_hex() {
        let stream = stream();
        let (slot, done) = collector();
        let key = decrypter_core::material::parse_key("0x00000000000000000000000000000000").unwrap();
        let iv = decrypter_core::material::parse_iv("00000000000000000000000000000000").unwrap();

        Decrypter::new(&stream.handle(), CBC_BLOCKS.to_vec(), key.as_bytes(), &iv.words(), done);
        stream.run_until_idle();

        assert_eq!(slot.lock().unwrap()[0].as_deref(), Ok(&b"0123456789abcdef01234"[..]));
    }
}
