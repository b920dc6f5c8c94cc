use thiserror::Error;

/// 签名、加密、解密过程中的错误
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid symmetric key length: expected 16, 24 or 32 bytes, got {actual}")]
    InvalidKeyLength { actual: usize },

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Signature verification failed: {0}")]
    Verification(String),

    #[error("Base64 decoding failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Secure random source failed: {0}")]
    Random(#[from] rand_core::OsError),
}
