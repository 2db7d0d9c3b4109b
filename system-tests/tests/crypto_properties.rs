// system-tests/tests/crypto_properties.rs
// ============================================================================
// Module: Crypto Properties
// Description: Universal properties of the signing-key encryption envelope.
// Purpose: Exercise AES-256-GCM round-trip, wrong-passphrase, and tamper
//          behavior against the real `tansive-crypto` implementation.
// Dependencies: tansive-crypto
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "System tests assert with panics; this crate is not published."
)]

mod helpers;

use tansive_crypto::key_encryption::decrypt;
use tansive_crypto::key_encryption::encrypt;

/// Round-trips a small plaintext through encrypt/decrypt under the same
/// passphrase (universal property 8).
#[test]
fn round_trip_recovers_the_original_plaintext() {
    let plaintext = b"a signing key's private half, as bytes";
    let blob = encrypt("correct horse battery staple", plaintext).expect("encrypt succeeds");
    let recovered = decrypt("correct horse battery staple", &blob).expect("decrypt succeeds");
    assert_eq!(recovered, plaintext);
}

/// Round-trips a large (1 MiB) blob, matching end-to-end scenario E6.
#[test]
fn round_trip_recovers_a_one_mebibyte_blob() {
    let plaintext: Vec<u8> = (0..1024 * 1024).map(|i| (i % 251) as u8).collect();
    let blob = encrypt("P", &plaintext).expect("encrypt succeeds");
    let recovered = decrypt("P", &blob).expect("decrypt succeeds");
    assert_eq!(recovered, plaintext);
}

/// Decryption under the wrong passphrase fails rather than returning
/// garbage plaintext.
#[test]
fn wrong_passphrase_fails_closed() {
    let blob = encrypt("P", b"1 MiB stand-in payload").expect("encrypt succeeds");
    let result = decrypt("P-prime", &blob);
    assert!(result.is_err());
}

/// Flipping any single byte of the stored blob causes decryption to fail,
/// whether the flip lands in the salt, nonce, ciphertext, or tag.
#[test]
fn single_byte_tamper_is_detected_everywhere_in_the_blob() {
    let passphrase = "tamper-probe";
    let blob = encrypt(passphrase, b"sixteen-byte-ish payload, padded a bit").expect("encrypt succeeds");
    assert!(decrypt(passphrase, &blob).is_ok(), "sanity: untampered blob decrypts");

    for index in 0..blob.len() {
        let mut tampered = blob.clone();
        tampered[index] ^= 0x01;
        assert!(decrypt(passphrase, &tampered).is_err(), "byte {index} tamper went undetected");
    }
}

/// A blob shorter than salt+nonce is rejected without panicking on a slice.
#[test]
fn blob_shorter_than_salt_and_nonce_is_rejected() {
    let result = decrypt("P", &[0u8; 10]);
    assert!(result.is_err());
}
