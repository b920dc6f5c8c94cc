//! AES-ECB 对称加密（PKCS#7 填充，密文以标准 Base64 文本传输）
//!
//! 密钥长度决定 AES 变体：16 字节为 AES-128，24 字节为 AES-192，32 字节为 AES-256。

use crate::crypto::errors::CryptoError;
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use base64::{Engine, engine::general_purpose};

fn encrypt_with<C>(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError>
where
    C: aes::cipher::BlockCipher + BlockEncryptMut + KeyInit,
{
    let cipher = ecb::Encryptor::<C>::new_from_slice(key)
        .map_err(|_| CryptoError::InvalidKeyLength { actual: key.len() })?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

fn decrypt_with<C>(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError>
where
    C: aes::cipher::BlockCipher + BlockDecryptMut + KeyInit,
{
    let cipher = ecb::Decryptor::<C>::new_from_slice(key)
        .map_err(|_| CryptoError::InvalidKeyLength { actual: key.len() })?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|e| CryptoError::Decryption(format!("AES解密失败: {}", e)))
}

/// 加密明文，返回 Base64 密文
pub fn aes_encrypt_ecb(plaintext: &[u8], key: &[u8]) -> Result<String, CryptoError> {
    let ciphertext = match key.len() {
        16 => encrypt_with::<Aes128>(key, plaintext)?,
        24 => encrypt_with::<Aes192>(key, plaintext)?,
        32 => encrypt_with::<Aes256>(key, plaintext)?,
        actual => return Err(CryptoError::InvalidKeyLength { actual }),
    };
    Ok(general_purpose::STANDARD.encode(ciphertext))
}

/// 解密 Base64 密文，返回明文字节
pub fn aes_decrypt_ecb(ciphertext: &str, key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let raw = general_purpose::STANDARD.decode(ciphertext.trim())?;
    if raw.is_empty() || raw.len() % 16 != 0 {
        return Err(CryptoError::Decryption(format!(
            "密文长度 {} 不是分组长度的整数倍",
            raw.len()
        )));
    }
    match key.len() {
        16 => decrypt_with::<Aes128>(key, &raw),
        24 => decrypt_with::<Aes192>(key, &raw),
        32 => decrypt_with::<Aes256>(key, &raw),
        actual => Err(CryptoError::InvalidKeyLength { actual }),
    }
}
