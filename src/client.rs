//! 客户端门面：构建信封、发送请求、校验状态码并解密业务数据。
//!
//! 每次调用都生成独立的信封与对称密钥，客户端本身只读，可以在多线程间共享。

#[cfg(feature = "async")]
pub mod async_;

use crate::common::config::{ClientConfig, ClientOptions};
use crate::common::utils::SymmetricKey;
use crate::crypto::{CryptoError, PrivateKey, PublicKey, aes_decrypt_ecb};
use crate::envelope::{EnvelopeBuilder, RequestEnvelope, ResponseEnvelope, UploadEnvelope};
use crate::error::{Error, Result};
use crate::transport::{self, DecodeError, sync_};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, error, warn};

#[cfg(feature = "async")]
pub use self::async_::AsyncClient;

/// 解密后的业务数据
pub type BusinessData = Map<String, Value>;

/// 解析后的商户凭证，同步与异步客户端共用
#[derive(Clone, Debug)]
pub(crate) struct Credentials {
    cert_id: String,
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl Credentials {
    pub(crate) fn from_config(config: &ClientConfig) -> std::result::Result<Self, CryptoError> {
        Ok(Self {
            cert_id: config.cert_id.clone(),
            private_key: PrivateKey::from_pem(&config.private_key)?,
            public_key: PublicKey::from_pem(&config.public_key)?,
        })
    }

    /// 构建已签名的信封，签名失败时记录错误后原样返回
    pub(crate) fn seal(
        &self,
        method: &str,
        version: &str,
        biz_content: &str,
        verbose: bool,
    ) -> Result<(RequestEnvelope, SymmetricKey)> {
        EnvelopeBuilder::new(&self.cert_id, &self.private_key, &self.public_key)
            .verbose(verbose)
            .build(method, version, biz_content)
            .map_err(|e| {
                error!(method, "签名失败: {}", e);
                Error::from(e)
            })
    }
}

/// 校验 `code` 并解密业务数据
pub(crate) fn finish_request(
    response: ResponseEnvelope,
    key: &SymmetricKey,
    options: &ClientOptions,
) -> Result<(ResponseEnvelope, BusinessData)> {
    if options.verbose {
        debug!(?response, "response");
    }
    if !response.is_success(&options.success_code) {
        warn!(code = %response.code, msg = %response.message, "request rejected");
        return Err(response.to_api_error().into());
    }
    let data = decode(key, &response.business_data)?;
    Ok((response, data))
}

/// 上传接口的两级状态：`code` 不成功是错误；`subCode` 不成功时不解密，返回 `None`
pub(crate) fn finish_upload(
    response: ResponseEnvelope,
    key: &SymmetricKey,
    options: &ClientOptions,
) -> Result<(ResponseEnvelope, Option<BusinessData>)> {
    if options.verbose {
        debug!(?response, "upload response");
    }
    if !response.is_success(&options.success_code) {
        warn!(code = %response.code, msg = %response.message, "upload rejected");
        return Err(response.to_api_error().into());
    }
    if !response.is_sub_success(&options.success_code) {
        warn!(
            sub_code = %response.sub_code,
            sub_msg = %response.sub_message,
            "upload accepted without business data"
        );
        return Ok((response, None));
    }
    let data = decode(key, &response.business_data)?;
    Ok((response, Some(data)))
}

/// 用请求时的对称密钥解密 `businessData` 并解析为 JSON 对象
pub fn decode(key: &SymmetricKey, business_data: &str) -> Result<BusinessData> {
    let plaintext = aes_decrypt_ecb(business_data, key.as_bytes())?;
    let data = serde_json::from_slice(&plaintext).map_err(DecodeError::BusinessData)?;
    Ok(data)
}

/// 同步客户端
#[derive(Clone, Debug)]
pub struct Client {
    credentials: Credentials,
    options: ClientOptions,
    http: reqwest::blocking::Client,
}

impl Client {
    /// 使用默认选项创建客户端。密钥在此处解析，格式错误立即失败。
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_options(config, ClientOptions::default())
    }

    pub fn with_options(config: &ClientConfig, options: ClientOptions) -> Result<Self> {
        let credentials = Credentials::from_config(config)?;
        let http = transport::blocking_client(&options)?;
        Ok(Self {
            credentials,
            options,
            http,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// 普通 POST 请求
    ///
    /// `biz_content` 为业务参数的 JSON 文本。`code` 不等于成功码时返回 [`Error::Api`]，
    /// 此时不会解密 `businessData`。
    pub fn request(
        &self,
        url: &str,
        method: &str,
        version: &str,
        biz_content: &str,
    ) -> Result<(ResponseEnvelope, BusinessData)> {
        let verbose = self.options.verbose;
        let (envelope, key) = self.credentials.seal(method, version, biz_content, verbose)?;
        let response = sync_::send_json(&self.http, url, &envelope, verbose)?;
        finish_request(response, &key, &self.options)
    }

    /// 与 [`Client::request`] 相同，业务参数由 serde 序列化
    pub fn request_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        method: &str,
        version: &str,
        biz_content: &T,
    ) -> Result<(ResponseEnvelope, BusinessData)> {
        let biz_content = serde_json::to_string(biz_content).map_err(Error::BizContent)?;
        self.request(url, method, version, &biz_content)
    }

    /// 文件上传请求
    ///
    /// `subCode` 不等于成功码时仍返回响应，但业务数据为 `None`。
    pub fn upload_request(
        &self,
        url: &str,
        method: &str,
        version: &str,
        file_path: impl AsRef<Path>,
        biz_content: &str,
    ) -> Result<(ResponseEnvelope, Option<BusinessData>)> {
        let verbose = self.options.verbose;
        let (envelope, key) = self.credentials.seal(method, version, biz_content, verbose)?;
        let upload = UploadEnvelope::new(envelope, file_path.as_ref());
        let response = sync_::send_multipart(&self.http, url, &upload, verbose)?;
        finish_upload(response, &key, &self.options)
    }
}
