//!
//! # 客户端配置模块
//!
//! `ClientConfig` 保存商户凭证（证书号与密钥对），由调用方长期持有、请求期间只读；
//! `ClientOptions` 控制传输超时、调试输出与成功码。
//!
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// 平台约定的成功码
pub const SUCCESS_CODE: &str = "SUCCESS";

/// 商户凭证
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// 平台分配的证书号，随请求以 `certId` 发送
    pub cert_id: String,
    /// 商户私钥（PEM 或 Base64 DER），用于签名
    pub private_key: String,
    /// 平台公钥（PEM 或 Base64 DER），用于加密 `check`
    pub public_key: String,
}

impl ClientConfig {
    pub fn new(
        cert_id: impl Into<String>,
        private_key: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self {
            cert_id: cert_id.into(),
            private_key: private_key.into(),
            public_key: public_key.into(),
        }
    }

    /// 从 JSON 对象解析，键名为 `cert_id`、`private_key`、`public_key`
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("解析客户端配置失败: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件加载
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("cert_id", &self.cert_id),
            ("private_key", &self.private_key),
            ("public_key", &self.public_key),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("配置项 {} 为空", name)));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("cert_id", &self.cert_id)
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// 传输与诊断选项
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientOptions {
    /// 单次请求的总超时（秒）
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    /// 建立连接的超时（秒）
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,
    /// 是否输出签名串、请求体、响应体等调试日志
    pub verbose: bool,
    /// 视为成功的 `code` / `subCode` 值
    pub success_code: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            verbose: false,
            success_code: SUCCESS_CODE.to_string(),
        }
    }
}

impl ClientOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
