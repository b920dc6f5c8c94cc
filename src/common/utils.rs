use crate::crypto::CryptoError;
use chrono::{DateTime, Local};
use rand_core::{OsRng, TryRngCore};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// 随机密钥字符表
pub const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// 每次请求生成的对称密钥长度（AES-128）
pub const SYMMETRIC_KEY_LEN: usize = 16;

const REQUEST_ID_FORMAT: &str = "%Y%m%d%H%M%S%3f";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 从系统安全随机源均匀抽取 `[0, bound)` 内的整数
///
/// 拒绝采样：丢弃落在 2^32 末尾不完整区间里的值，避免取模偏差。
fn uniform_below(bound: u32) -> Result<u32, CryptoError> {
    let range = 1u64 << 32;
    let limit = range - range % u64::from(bound);
    loop {
        let candidate = OsRng.try_next_u32()?;
        if u64::from(candidate) < limit {
            return Ok(candidate % bound);
        }
    }
}

/// 生成由 [`ALPHABET`] 字符组成的随机串，每个字符独立均匀抽取
pub fn random_string(length: usize) -> Result<String, CryptoError> {
    let bound = ALPHABET.len() as u32;
    let mut out = String::with_capacity(length);
    for _ in 0..length {
        let index = uniform_below(bound)? as usize;
        out.push(char::from(ALPHABET[index]));
    }
    Ok(out)
}

/// 请求号：本地时间精确到毫秒，字典序即时间序
pub fn request_id(now: &DateTime<Local>) -> String {
    now.format(REQUEST_ID_FORMAT).to_string()
}

/// 请求时间戳：`yyyy-MM-dd HH:mm:ss`
pub fn timestamp(now: &DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// 单次请求使用的对称密钥。
///
/// 只存在于内存中，释放时清零；对外只以 RSA 加密后的 `check` 形式出现。
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey(Vec<u8>);

impl SymmetricKey {
    /// 生成新的随机密钥
    pub fn generate() -> Result<Self, CryptoError> {
        Ok(Self(random_string(SYMMETRIC_KEY_LEN)?.into_bytes()))
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for SymmetricKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}
