//! 密码学原语：RSA 加密/签名与 AES-ECB 对称加密。
//!
//! 信封构建器只通过这里的四个操作与底层算法交互：
//! `PublicKey::encrypt`、`PrivateKey::sign`、`aes_encrypt_ecb`、`aes_decrypt_ecb`。

pub mod aes_ecb;
pub mod errors;
pub mod rsa;

pub use self::aes_ecb::{aes_decrypt_ecb, aes_encrypt_ecb};
pub use self::errors::CryptoError;
pub use self::rsa::{PrivateKey, PublicKey};
