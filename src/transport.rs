//! 传输层：把信封发往平台并解析响应信封。
//!
//! 同步实现基于阻塞版 `reqwest`，异步实现位于 `async_`（需要 `async` 特性）。
//! 两者共用这里的响应体解码：平台可能对整个响应体再做一次 Base64，
//! 解码成功则使用解码结果，失败则按原始字节处理。

#[cfg(feature = "async")]
pub mod async_;
pub mod sync_;

use crate::common::config::ClientOptions;
use crate::envelope::ResponseEnvelope;
use base64::{Engine, engine::general_purpose};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// 上传文件所用的表单字段名
pub const FILE_FIELD: &str = "file";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status: {0}")]
    Status(u16),

    #[error("failed to open upload file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize request envelope: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("response body is not a valid response envelope: {0}")]
    Response(#[source] serde_json::Error),

    #[error("business data is not a JSON object: {0}")]
    BusinessData(#[source] serde_json::Error),
}

/// 尝试对响应体做 Base64 解码，失败时原样返回
pub fn unwrap_base64(body: &[u8]) -> Cow<'_, [u8]> {
    match general_purpose::STANDARD.decode(body.trim_ascii()) {
        Ok(decoded) => Cow::Owned(decoded),
        Err(_) => Cow::Borrowed(body),
    }
}

/// 将响应体解析为响应信封
pub fn decode_body(body: &[u8], verbose: bool) -> Result<ResponseEnvelope, DecodeError> {
    if verbose {
        debug!("response body: {}", String::from_utf8_lossy(body));
    }
    let body = unwrap_base64(body);
    if verbose {
        debug!("decoded response body: {}", String::from_utf8_lossy(&body));
    }
    serde_json::from_slice(&body).map_err(DecodeError::Response)
}

/// 上传时使用的文件名：路径的最后一段
pub(crate) fn upload_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| FILE_FIELD.to_string())
}

/// 按选项构建阻塞 HTTP 客户端
pub fn blocking_client(options: &ClientOptions) -> Result<reqwest::blocking::Client, TransportError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(options.timeout)
        .connect_timeout(options.connect_timeout)
        .build()?;
    Ok(client)
}
