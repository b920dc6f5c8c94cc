//! 请求信封与构建流程
//!
//! 构建顺序固定：生成请求号与时间戳 → 生成对称密钥 → 用平台公钥加密密钥得到 `check`
//! → 用对称密钥加密业务内容 → 按固定字段顺序拼接签名串 → 商户私钥签名。

use crate::common::utils::{self, SymmetricKey};
use crate::crypto::{CryptoError, PrivateKey, PublicKey, aes_encrypt_ecb};
use base64::{Engine, engine::general_purpose};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::form_urlencoded;

/// 固定字符集
pub const CHARSET: &str = "utf-8";

/// 请求公共参数
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestEnvelope {
    #[serde(rename = "timeStamp")]
    pub timestamp: String,
    pub method: String,
    pub charset: String,
    #[serde(rename = "sign")]
    pub signature: String,
    pub check: String,
    #[serde(rename = "bizContent")]
    pub biz_content: String,
    #[serde(rename = "reqId")]
    pub request_id: String,
    #[serde(rename = "certId")]
    pub cert_id: String,
    pub version: String,
}

impl RequestEnvelope {
    /// 创建未加密、未签名的信封
    pub fn new(method: &str, version: &str, cert_id: &str, now: &DateTime<Local>) -> Self {
        Self {
            request_id: utils::request_id(now),
            timestamp: utils::timestamp(now),
            method: method.to_string(),
            charset: CHARSET.to_string(),
            version: version.to_string(),
            cert_id: cert_id.to_string(),
            ..Default::default()
        }
    }

    /// 用平台公钥加密对称密钥，Base64 后写入 `check`
    pub fn encrypt_check(&mut self, public_key: &PublicKey, key: &SymmetricKey) -> Result<(), CryptoError> {
        let check = public_key.encrypt(key.as_bytes())?;
        self.check = general_purpose::STANDARD.encode(check);
        Ok(())
    }

    /// 用对称密钥加密业务内容，写入 `bizContent`
    pub fn encrypt_biz_content(&mut self, plaintext: &str, key: &SymmetricKey) -> Result<(), CryptoError> {
        self.biz_content = aes_encrypt_ecb(plaintext.as_bytes(), key.as_bytes())?;
        Ok(())
    }

    /// 规范化签名串。
    ///
    /// 字段顺序是协议的一部分，不按字母序；值做 URL 编码。
    pub fn sign_content(&self) -> String {
        let pairs = [
            ("timeStamp", &self.timestamp),
            ("method", &self.method),
            ("charset", &self.charset),
            ("reqId", &self.request_id),
            ("certId", &self.cert_id),
            ("version", &self.version),
            ("check", &self.check),
            ("bizContent", &self.biz_content),
        ];
        pairs
            .iter()
            .map(|(key, value)| {
                let encoded: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
                format!("{}={}", key, encoded)
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// 对签名串签名，写入 `sign`
    pub fn calc_sign(&mut self, private_key: &PrivateKey, verbose: bool) -> Result<(), CryptoError> {
        let content = self.sign_content();
        if verbose {
            debug!(reqId = %self.request_id, "before calc sign: {}", content);
        }
        self.signature = private_key.sign(content.as_bytes())?;
        Ok(())
    }

    /// 用商户公钥校验 `sign`，即平台侧的验签
    pub fn verify(&self, public_key: &PublicKey) -> Result<(), CryptoError> {
        public_key.verify(self.sign_content().as_bytes(), &self.signature)
    }

    /// 扁平字段表，顺序与 JSON 序列化一致；文件上传时逐项写入表单
    pub fn to_form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("timeStamp", self.timestamp.clone()),
            ("method", self.method.clone()),
            ("charset", self.charset.clone()),
            ("sign", self.signature.clone()),
            ("check", self.check.clone()),
            ("bizContent", self.biz_content.clone()),
            ("reqId", self.request_id.clone()),
            ("certId", self.cert_id.clone()),
            ("version", self.version.clone()),
        ]
    }
}

/// 文件上传请求：基础信封加上待上传文件
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadEnvelope {
    pub envelope: RequestEnvelope,
    pub file: PathBuf,
}

impl UploadEnvelope {
    pub fn new(envelope: RequestEnvelope, file: impl Into<PathBuf>) -> Self {
        Self {
            envelope,
            file: file.into(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// `application/x-www-form-urlencoded` 编码，键按字典序排列
    pub fn encode(&self) -> String {
        let mut fields = self.envelope.to_form_fields();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish()
    }
}

/// 按固定流程生成已加密、已签名的请求信封
pub struct EnvelopeBuilder<'a> {
    cert_id: &'a str,
    private_key: &'a PrivateKey,
    public_key: &'a PublicKey,
    verbose: bool,
}

impl<'a> EnvelopeBuilder<'a> {
    pub fn new(cert_id: &'a str, private_key: &'a PrivateKey, public_key: &'a PublicKey) -> Self {
        Self {
            cert_id,
            private_key,
            public_key,
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// 生成新的对称密钥并构建信封。
    ///
    /// 返回的密钥用于解密响应的 `businessData`，调用结束即释放。
    pub fn build(
        &self,
        method: &str,
        version: &str,
        biz_content: &str,
    ) -> Result<(RequestEnvelope, SymmetricKey), CryptoError> {
        let key = SymmetricKey::generate()?;
        let envelope = self.build_with_key(method, version, biz_content, &key, &Local::now())?;
        Ok((envelope, key))
    }

    /// 使用给定的密钥与时间构建信封
    pub fn build_with_key(
        &self,
        method: &str,
        version: &str,
        biz_content: &str,
        key: &SymmetricKey,
        now: &DateTime<Local>,
    ) -> Result<RequestEnvelope, CryptoError> {
        if self.verbose {
            debug!(method, version, "request bizContent: {}", biz_content);
        }
        let mut envelope = RequestEnvelope::new(method, version, self.cert_id, now);
        envelope.encrypt_check(self.public_key, key)?;
        envelope.encrypt_biz_content(biz_content, key)?;
        envelope.calc_sign(self.private_key, self.verbose)?;
        Ok(envelope)
    }
}
