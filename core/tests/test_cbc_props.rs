#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
    use decrypter_core::crypto::{self, unpad};
    use decrypter_core::prelude::*;
    use proptest::prelude::*;

    type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

    fn encrypt(key: &[u8; 16], iv: &[u8; 16], msg: &[u8]) -> Vec<u8> {
        let mut buf = vec![0u8; msg.len() + 16 - msg.len() % 16];
        buf[..msg.len()].copy_from_slice(msg);
        Aes128CbcEnc::new(key.into(), iv.into())
            .encrypt_padded_mut::<Pkcs7>(&mut buf, msg.len())
            .unwrap()
            .to_vec()
    }

    fn chunked(ct: Vec<u8>, key: &[u8; 16], iv: &[u8; 16], chunk_words: usize) -> DecryptResult {
        let stream = AsyncStream::with_delay(Duration::ZERO);
        let slot = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&slot);
        let iv_words = Iv::from_be_bytes(iv).unwrap().words();

        Decrypter::with_chunk_words(&stream.handle(), ct, key, &iv_words, chunk_words, move |res| {
            *sink.lock().unwrap() = Some(res);
        });
        stream.run_until_idle();
        let out = slot.lock().unwrap().take().unwrap();
        out
    }

    #[test]
    fn test_sync_decrypt_keeps_padding() {
        let key = [3u8; 16];
        let iv = [5u8; 16];
        let ct = encrypt(&key, &iv, b"abc");

        let padded = crypto::decrypt(&ct, &Key128::from(key), &Iv::from_be_bytes(&iv).unwrap()).unwrap();
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[3..], &[13u8; 13][..]);
        assert_eq!(unpad(&padded).unwrap(), b"abc");
    }

    proptest! {
        #[test]
        fn prop_matches_reference_cbc(
            key in any::<[u8; 16]>(),
            iv in any::<[u8; 16]>(),
            msg in proptest::collection::vec(any::<u8>(), 0..600),
        ) {
            let ct = encrypt(&key, &iv, &msg);
            let out = chunked(ct, &key, &iv, Decrypter::STEP).unwrap();
            prop_assert_eq!(out, msg);
        }

        #[test]
        fn prop_chunk_size_is_transparent(
            key in any::<[u8; 16]>(),
            iv in any::<[u8; 16]>(),
            msg in proptest::collection::vec(any::<u8>(), 0..400),
            blocks_per_chunk in 1usize..40,
        ) {
            let ct = encrypt(&key, &iv, &msg);
            let whole = chunked(ct.clone(), &key, &iv, Decrypter::STEP);
            let split = chunked(ct, &key, &iv, blocks_per_chunk * 4);
            prop_assert_eq!(whole, split);
        }

        #[test]
        fn prop_padding_is_strict(tail in any::<[u8; 16]>()) {
            match unpad(&tail) {
                Ok(msg) => {
                    let n = 16 - msg.len();
                    prop_assert!((1..=16).contains(&n));
                    prop_assert!(tail[msg.len()..].iter().all(|&b| b as usize == n));
                }
                Err(e) => prop_assert!(
                    matches!(e, DecryptError::InvalidPadding { .. }),
                    "unexpected error {:?}",
                    e
                ),
            }
        }
    }
}
