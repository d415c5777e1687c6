use prost::Message;

use crate::error::EncodingError;

/// Binary encoding/decoding with hex string support for wire messages.
///
/// Implemented for every prost message. Decoding follows protobuf rules: unknown
/// fields are skipped and absent fields take their defaults.
pub trait Encodable: Sized {
    fn to_bytes(&self) -> Vec<u8>;

    fn from_bytes(buf: &[u8]) -> Result<Self, EncodingError>;

    fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    fn from_hex(hex: &str) -> Result<Self, EncodingError> {
        Self::from_bytes(&hex::decode(hex)?)
    }
}

impl<M> Encodable for M
where
    M: Message + Default,
{
    fn to_bytes(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    fn from_bytes(buf: &[u8]) -> Result<Self, EncodingError> {
        Ok(M::decode(buf)?)
    }
}

#[cfg(test)]
mod tests {
    use super::Encodable;
    use crate::error::EncodingError;

    #[derive(Clone, PartialEq, prost::Message)]
    struct TestPayload {
        #[prost(uint32, tag = "1")]
        value: u32,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    struct TestPayloadV2 {
        #[prost(uint32, tag = "1")]
        value: u32,
        #[prost(string, tag = "2")]
        label: String,
    }

    #[test]
    fn decode_skips_unknown_fields() {
        let newer = TestPayloadV2 {
            value: 7,
            label: "added later".to_string(),
        };

        let older = TestPayload::from_bytes(&newer.to_bytes()).expect("decodes");
        assert_eq!(older, TestPayload { value: 7 });
    }

    #[test]
    fn empty_buffer_decodes_to_defaults() {
        let decoded = TestPayloadV2::from_bytes(&[]).expect("decodes");
        assert_eq!(decoded, TestPayloadV2::default());
    }

    #[test]
    fn from_hex_rejects_invalid_hex() {
        let err = TestPayload::from_hex("0g").expect_err("must reject");
        assert!(matches!(err, EncodingError::HexDecode(_)));
    }

    #[test]
    fn from_bytes_rejects_truncated_varint() {
        let err = TestPayload::from_bytes(&[0x08, 0x80]).expect_err("must reject truncated");
        assert!(matches!(err, EncodingError::BinaryDecode(_)));
    }
}
