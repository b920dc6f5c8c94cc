//! # ys-sdk: 开放平台接口客户端
//!
//! 每次请求都会：
//!
//! 1. 生成请求号、时间戳与一次性的 16 位对称密钥；
//! 2. 用平台公钥 RSA 加密对称密钥得到 `check`，用对称密钥 AES-ECB 加密业务参数得到 `bizContent`；
//! 3. 按固定字段顺序拼接签名串，用商户私钥做 SHA256withRSA 签名；
//! 4. 以 JSON 或 multipart 表单 POST 到平台，解析（可能经过 Base64 包装的）响应信封；
//! 5. 校验状态码，并用同一个对称密钥解密 `businessData`。
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ys_sdk::{Client, ClientConfig};
//!
//! fn main() -> ys_sdk::Result<()> {
//!     let config = ClientConfig::from_file("ys_config.json")?;
//!     let client = Client::new(&config)?;
//!
//!     let (response, data) = client.request(
//!         "https://openapi.example.com/gateway",
//!         "trade.order.query",
//!         "v2.0.0",
//!         r#"{"orderNo":"20240101000001"}"#,
//!     )?;
//!     println!("{} {:?}", response.code, data.get("tradeStatus"));
//!     Ok(())
//! }
//! ```
//!
//! 日志通过 `tracing` 输出；签名串、请求体、响应体等明细只在
//! [`ClientOptions::verbose`] 打开时记录。

pub mod client;
pub mod common;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod transport;

pub use crate::client::{BusinessData, Client};
#[cfg(feature = "async")]
pub use crate::client::AsyncClient;
pub use crate::common::config::{ClientConfig, ClientOptions, SUCCESS_CODE};
pub use crate::envelope::{RequestEnvelope, ResponseEnvelope, UploadEnvelope};
pub use crate::error::{ApiError, Error, Result};

/// The version of the `ys-sdk` crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
