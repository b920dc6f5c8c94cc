//! Defines the custom error type for the `ys-sdk` crate.

use crate::crypto::CryptoError;
use crate::transport::{DecodeError, TransportError};
use thiserror::Error;

/// 平台返回的非成功业务码
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("code:{code} msg:{message}")]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub sub_code: String,
    pub sub_message: String,
}

/// The main error type for the `ys-sdk` crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("api error: {0}")]
    Api(#[from] ApiError),

    #[error("failed to serialize business content: {0}")]
    BizContent(#[source] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
