//! RSA 原语。
//!
//! 平台公钥用于加密每次请求的对称密钥（`check` 字段，PKCS#1 v1.5），
//! 商户私钥用于对规范化签名串做 SHA256withRSA（PKCS#1 v1.5）签名。
//! 私钥解密与验签是平台侧的对应操作，一并提供。

use crate::crypto::errors::CryptoError;
use base64::{Engine, engine::general_purpose};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::rand_core::OsRng;
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use std::fmt;

const PEM_PREFIX: &str = "-----BEGIN";

/// 解码不带 PEM 头的 Base64 DER 密钥（平台控制台常以这种形式下发）
fn decode_bare_der(data: &str) -> Result<Vec<u8>, CryptoError> {
    let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| CryptoError::InvalidKey(format!("密钥既不是PEM也不是Base64 DER: {}", e)))
}

/// RSA 公钥，接受 PKCS#8 (`PUBLIC KEY`) 与 PKCS#1 (`RSA PUBLIC KEY`) 两种编码
#[derive(Clone, PartialEq)]
pub struct PublicKey(RsaPublicKey);

impl PublicKey {
    pub fn from_pem(data: &str) -> Result<Self, CryptoError> {
        let data = data.trim();
        let key = if data.starts_with(PEM_PREFIX) {
            RsaPublicKey::from_public_key_pem(data)
                .or_else(|_| RsaPublicKey::from_pkcs1_pem(data))
                .map_err(|e| CryptoError::InvalidKey(format!("解析RSA公钥失败: {}", e)))?
        } else {
            let der = decode_bare_der(data)?;
            RsaPublicKey::from_public_key_der(&der)
                .or_else(|_| RsaPublicKey::from_pkcs1_der(&der))
                .map_err(|e| CryptoError::InvalidKey(format!("解析RSA公钥失败: {}", e)))?
        };
        Ok(Self(key))
    }

    /// PKCS#1 v1.5 加密
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut rng = OsRng;
        self.0
            .encrypt(&mut rng, Pkcs1v15Encrypt, data)
            .map_err(|e| CryptoError::Encryption(format!("RSA加密失败: {}", e)))
    }

    /// 校验 Base64 编码的 SHA256withRSA 签名
    pub fn verify(&self, message: &[u8], signature: &str) -> Result<(), CryptoError> {
        let raw = general_purpose::STANDARD.decode(signature.trim())?;
        let signature = Signature::try_from(raw.as_slice())
            .map_err(|e| CryptoError::Verification(format!("无效的签名格式: {}", e)))?;

        VerifyingKey::<Sha256>::new(self.0.clone())
            .verify(message, &signature)
            .map_err(|e| CryptoError::Verification(format!("签名验证失败: {}", e)))
    }

    pub fn inner(&self) -> &RsaPublicKey {
        &self.0
    }
}

impl From<RsaPublicKey> for PublicKey {
    fn from(key: RsaPublicKey) -> Self {
        Self(key)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use rsa::traits::PublicKeyParts;
        f.debug_struct("PublicKey")
            .field("bits", &(self.0.size() * 8))
            .finish()
    }
}

/// RSA 私钥，接受 PKCS#8 (`PRIVATE KEY`) 与 PKCS#1 (`RSA PRIVATE KEY`) 两种编码。
///
/// 内部的 `RsaPrivateKey` 在释放时自行清零。
#[derive(Clone)]
pub struct PrivateKey(RsaPrivateKey);

impl PrivateKey {
    pub fn from_pem(data: &str) -> Result<Self, CryptoError> {
        let data = data.trim();
        let key = if data.starts_with(PEM_PREFIX) {
            RsaPrivateKey::from_pkcs8_pem(data)
                .or_else(|_| RsaPrivateKey::from_pkcs1_pem(data))
                .map_err(|e| CryptoError::InvalidKey(format!("解析RSA私钥失败: {}", e)))?
        } else {
            let der = decode_bare_der(data)?;
            RsaPrivateKey::from_pkcs8_der(&der)
                .or_else(|_| RsaPrivateKey::from_pkcs1_der(&der))
                .map_err(|e| CryptoError::InvalidKey(format!("解析RSA私钥失败: {}", e)))?
        };
        Ok(Self(key))
    }

    /// SHA256withRSA 签名，返回 Base64 文本
    pub fn sign(&self, message: &[u8]) -> Result<String, CryptoError> {
        let signing_key = SigningKey::<Sha256>::new(self.0.clone());
        let signature = signing_key
            .try_sign(message)
            .map_err(|e| CryptoError::Signing(format!("RSA签名失败: {}", e)))?;
        Ok(general_purpose::STANDARD.encode(signature.to_vec()))
    }

    /// PKCS#1 v1.5 解密
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.0
            .decrypt(Pkcs1v15Encrypt, ciphertext)
            .map_err(|e| CryptoError::Decryption(format!("RSA解密失败: {}", e)))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(RsaPublicKey::from(&self.0))
    }
}

impl From<RsaPrivateKey> for PrivateKey {
    fn from(key: RsaPrivateKey) -> Self {
        Self(key)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}
