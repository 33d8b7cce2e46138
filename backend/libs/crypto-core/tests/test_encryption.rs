use crypto_core::{
    canonical_pair, chat_channel, decrypt, derive_key, encrypt, CryptoError, MessageSecret,
    PRIVATE_CHAT_CHANNEL_PREFIX,
};

#[test]
fn example_hello_roundtrip() {
    let key = derive_key("u1", "s3cr3t").expect("derive");
    let encrypted = encrypt("hello", &key);
    assert_eq!(encrypted.ciphertext_hex.len(), 10);
    assert_eq!(
        decrypt(&encrypted.ciphertext_hex, &encrypted.iv_hex, &key).expect("decrypt"),
        "hello"
    );
}

#[test]
fn receiver_reads_with_sender_key() {
    let secret = MessageSecret::new("server-secret").expect("secret");
    let alice_key = secret.derive_key("alice").expect("alice key");
    let bob_key = secret.derive_key("bob").expect("bob key");

    let stored = encrypt("hi bob", &alice_key);

    // bob reads alice's message by re-deriving the sender's key
    let sender_key = secret.derive_key("alice").expect("rederive");
    assert_eq!(
        decrypt(&stored.ciphertext_hex, &stored.iv_hex, &sender_key).expect("decrypt"),
        "hi bob"
    );
    assert_ne!(
        decrypt(&stored.ciphertext_hex, &stored.iv_hex, &bob_key).expect("decrypt"),
        "hi bob"
    );
}

#[test]
fn both_sides_share_one_channel() {
    assert_eq!(canonical_pair("bob", "alice"), Ok(("alice", "bob")));
    assert_eq!(
        chat_channel(PRIVATE_CHAT_CHANNEL_PREFIX, "alice", "bob"),
        chat_channel(PRIVATE_CHAT_CHANNEL_PREFIX, "bob", "alice")
    );
    assert_eq!(canonical_pair("alice", "alice"), Err(CryptoError::SelfPair));
}
