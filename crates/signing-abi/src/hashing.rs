//! Hash helpers shared by planners and chain compilers.

use sha2::{Digest, Sha256};

/// SHA256 of an arbitrary byte payload.
#[must_use]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Double SHA256, the transaction id hash of Bitcoin-derived chains.
#[must_use]
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Transaction id in the byte-reversed hex form block explorers display.
#[must_use]
pub fn display_txid(encoded_tx: &[u8]) -> String {
    let mut hash = sha256d(encoded_tx);
    hash.reverse();
    hex::encode(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256d_hashes_twice() {
        assert_eq!(
            hex::encode(sha256d(b"hello")),
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        );
    }

    #[test]
    fn display_txid_is_reversed() {
        let forward = hex::encode(sha256d(b"hello"));
        let displayed = display_txid(b"hello");

        let reversed: String = forward
            .as_bytes()
            .chunks(2)
            .rev()
            .map(|pair| std::str::from_utf8(pair).expect("hex is ascii"))
            .collect();
        assert_eq!(displayed, reversed);
    }
}
