pub mod fixtures;

use fixtures::engine;
use proptest::prelude::*;
use sfetch_crypto::prelude::*;

proptest! {
    #[test]
    fn open_inverts_seal(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let sender = engine();
        let receiver = engine();

        let wire = sender.seal(MessageKind::Request, &data, None).unwrap().to_bytes().unwrap();
        let opened = receiver.open(&Envelope::from_bytes(&wire).unwrap(), MessageKind::Request).unwrap();
        prop_assert_eq!(opened.plaintext, data);
    }

    #[test]
    fn ciphertext_never_contains_long_plaintext_runs(word in "[a-zA-Z]{12,32}") {
        let envelope = engine().seal(MessageKind::Request, word.as_bytes(), None).unwrap();
        let wire = envelope.to_bytes().unwrap();
        prop_assert!(!wire.windows(word.len()).any(|w| w == word.as_bytes()));
    }
}
