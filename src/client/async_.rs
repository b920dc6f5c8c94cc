//! 异步客户端
#![cfg(feature = "async")]

use crate::client::{BusinessData, Credentials, finish_request, finish_upload};
use crate::common::config::{ClientConfig, ClientOptions};
use crate::envelope::{ResponseEnvelope, UploadEnvelope};
use crate::error::{Error, Result};
use crate::transport::{TransportError, async_};
use serde::Serialize;
use std::path::Path;

/// `AsyncClient`：与 [`Client`](crate::client::Client) 相同的两种请求，基于异步 `reqwest`。
///
/// 信封构建与签名是纯计算，在当前任务中同步完成；只有网络与文件 I/O 会让出执行权。
#[derive(Clone, Debug)]
pub struct AsyncClient {
    credentials: Credentials,
    options: ClientOptions,
    http: reqwest::Client,
}

impl AsyncClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_options(config, ClientOptions::default())
    }

    pub fn with_options(config: &ClientConfig, options: ClientOptions) -> Result<Self> {
        let credentials = Credentials::from_config(config)?;
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .build()
            .map_err(TransportError::Http)?;
        Ok(Self {
            credentials,
            options,
            http,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub async fn request(
        &self,
        url: &str,
        method: &str,
        version: &str,
        biz_content: &str,
    ) -> Result<(ResponseEnvelope, BusinessData)> {
        let verbose = self.options.verbose;
        let (envelope, key) = self.credentials.seal(method, version, biz_content, verbose)?;
        let response = async_::send_json(&self.http, url, &envelope, verbose).await?;
        finish_request(response, &key, &self.options)
    }

    pub async fn request_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        method: &str,
        version: &str,
        biz_content: &T,
    ) -> Result<(ResponseEnvelope, BusinessData)> {
        let biz_content = serde_json::to_string(biz_content).map_err(Error::BizContent)?;
        self.request(url, method, version, &biz_content).await
    }

    pub async fn upload_request(
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
        let response = async_::send_multipart(&self.http, url, &upload, verbose).await?;
        finish_upload(response, &key, &self.options)
    }
}
