//!
//! 集成测试的通用辅助函数：一次性 HTTP 桩服务、测试密钥与平台侧模拟
//!
#![allow(dead_code)]

use base64::{Engine, engine::general_purpose};
use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::rand_core::OsRng;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::OnceLock;
use std::thread::JoinHandle;
use ys_sdk::crypto::{PrivateKey, aes_decrypt_ecb, aes_encrypt_ecb};
use ys_sdk::{ClientConfig, RequestEnvelope};

pub const CERT_ID: &str = "826000000001";

/// 进程内共享的测试密钥：商户密钥对与平台密钥对
pub struct TestKeys {
    pub merchant_private_pem: String,
    pub merchant_public_pem: String,
    pub platform_private_pem: String,
    pub platform_public_pem: String,
}

pub fn keys() -> &'static TestKeys {
    static KEYS: OnceLock<TestKeys> = OnceLock::new();
    KEYS.get_or_init(|| {
        let merchant = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
        let platform = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();
        TestKeys {
            merchant_private_pem: merchant.to_pkcs8_pem(LineEnding::LF).unwrap().to_string(),
            merchant_public_pem: merchant
                .to_public_key()
                .to_public_key_pem(LineEnding::LF)
                .unwrap(),
            platform_private_pem: platform.to_pkcs8_pem(LineEnding::LF).unwrap().to_string(),
            platform_public_pem: platform
                .to_public_key()
                .to_public_key_pem(LineEnding::LF)
                .unwrap(),
        }
    })
}

/// 商户侧配置：商户私钥 + 平台公钥
pub fn client_config() -> ClientConfig {
    let keys = keys();
    ClientConfig::new(
        CERT_ID,
        keys.merchant_private_pem.clone(),
        keys.platform_public_pem.clone(),
    )
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("ys_sdk=debug")
        .with_test_writer()
        .try_init();
}

// === HTTP 桩服务 ===

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 解析 multipart 表单，返回 (字段名, 文件名, 内容)
    pub fn multipart_parts(&self) -> Vec<(String, Option<String>, Vec<u8>)> {
        let content_type = self.header("content-type").expect("missing content-type");
        let boundary = content_type
            .split("boundary=")
            .nth(1)
            .expect("missing boundary")
            .trim_matches('"');
        let delimiter = format!("--{}", boundary).into_bytes();

        split_bytes(&self.body, &delimiter)
            .into_iter()
            .filter_map(|segment| {
                let segment = segment.strip_prefix(b"\r\n")?;
                let header_end = find_bytes(segment, b"\r\n\r\n")?;
                let headers = String::from_utf8_lossy(&segment[..header_end]).to_string();
                let content = segment[header_end + 4..]
                    .strip_suffix(b"\r\n")
                    .unwrap_or(&segment[header_end + 4..])
                    .to_vec();
                let name = disposition_param(&headers, "name")?;
                let filename = disposition_param(&headers, "filename");
                Some((name, filename, content))
            })
            .collect()
    }

    /// 表单中的文本字段
    pub fn form_field(&self, name: &str) -> Option<String> {
        self.multipart_parts()
            .into_iter()
            .find(|(field, filename, _)| field == name && filename.is_none())
            .map(|(_, _, content)| String::from_utf8(content).unwrap())
    }
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn split_bytes<'a>(mut data: &'a [u8], delimiter: &[u8]) -> Vec<&'a [u8]> {
    let mut out = Vec::new();
    while let Some(pos) = find_bytes(data, delimiter) {
        out.push(&data[..pos]);
        data = &data[pos + delimiter.len()..];
    }
    out.push(data);
    out
}

fn disposition_param(headers: &str, param: &str) -> Option<String> {
    let pattern = format!("; {}=\"", param);
    let start = headers.find(&pattern)? + pattern.len();
    let end = headers[start..].find('"')? + start;
    Some(headers[start..end].to_string())
}

fn read_request(reader: &mut impl BufRead) -> CapturedRequest {
    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    let mut request = CapturedRequest {
        method,
        path,
        headers,
        body: Vec::new(),
    };
    if request
        .header("transfer-encoding")
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"))
    {
        request.body = read_chunked(reader);
    } else if let Some(length) = request.header("content-length") {
        let mut body = vec![0u8; length.parse().unwrap()];
        reader.read_exact(&mut body).unwrap();
        request.body = body;
    }
    request
}

fn read_chunked(reader: &mut impl BufRead) -> Vec<u8> {
    let mut body = Vec::new();
    loop {
        let mut size_line = String::new();
        reader.read_line(&mut size_line).unwrap();
        let size_hex = size_line.trim().split(';').next().unwrap_or("0");
        let size = usize::from_str_radix(size_hex, 16).unwrap();
        if size == 0 {
            loop {
                let mut trailer = String::new();
                reader.read_line(&mut trailer).unwrap();
                if trailer.trim().is_empty() {
                    break;
                }
            }
            return body;
        }
        let mut chunk = vec![0u8; size];
        reader.read_exact(&mut chunk).unwrap();
        body.extend_from_slice(&chunk);
        let mut crlf = [0u8; 2];
        reader.read_exact(&mut crlf).unwrap();
    }
}

/// 只处理一个请求的 HTTP 桩服务
pub struct MockServer {
    pub url: String,
    handle: JoinHandle<CapturedRequest>,
}

impl MockServer {
    /// 固定返回给定状态码与响应体
    pub fn start(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        Self::start_with(move |_| (status, body))
    }

    /// 根据收到的请求计算响应
    pub fn start_with<F>(responder: F) -> Self
    where
        F: FnOnce(&CapturedRequest) -> (u16, Vec<u8>) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/gateway", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let request = read_request(&mut reader);
            let (status, body) = responder(&request);

            let reason = if status == 200 { "OK" } else { "Error" };
            let head = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                reason,
                body.len()
            );
            let stream = reader.get_mut();
            // 客户端可能已因超时断开
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
            let _ = stream.flush();
            request
        });
        Self { url, handle }
    }

    /// 等待服务处理完请求并返回捕获的内容
    pub fn captured(self) -> CapturedRequest {
        self.handle.join().unwrap()
    }
}

/// 一个没有服务监听的本地地址
pub fn unused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/gateway", addr)
}

// === 平台侧模拟 ===

/// 平台收到的请求内容
pub struct OpenedRequest {
    pub envelope: RequestEnvelope,
    pub key: Vec<u8>,
    pub biz_content: String,
}

/// 验签、解出对称密钥与业务参数，任何一步失败都会 panic
pub fn open_envelope(envelope: RequestEnvelope) -> OpenedRequest {
    let keys = keys();
    let merchant_public = ys_sdk::crypto::PublicKey::from_pem(&keys.merchant_public_pem).unwrap();
    envelope.verify(&merchant_public).expect("signature must verify");

    let platform_private = PrivateKey::from_pem(&keys.platform_private_pem).unwrap();
    let check = general_purpose::STANDARD.decode(&envelope.check).unwrap();
    let key = platform_private.decrypt(&check).unwrap();
    let biz_content = String::from_utf8(aes_decrypt_ecb(&envelope.biz_content, &key).unwrap()).unwrap();

    OpenedRequest {
        envelope,
        key,
        biz_content,
    }
}

/// 从 multipart 表单字段还原请求信封
pub fn envelope_from_form(request: &CapturedRequest) -> RequestEnvelope {
    let field = |name: &str| request.form_field(name).unwrap_or_default();
    RequestEnvelope {
        timestamp: field("timeStamp"),
        method: field("method"),
        charset: field("charset"),
        signature: field("sign"),
        check: field("check"),
        biz_content: field("bizContent"),
        request_id: field("reqId"),
        cert_id: field("certId"),
        version: field("version"),
    }
}

/// 平台响应：`businessData` 用请求的对称密钥加密，整个响应体再做 Base64
pub fn gateway_response(
    key: &[u8],
    code: &str,
    sub_code: &str,
    business: &serde_json::Value,
    wrap_base64: bool,
) -> Vec<u8> {
    let business_data = aes_encrypt_ecb(business.to_string().as_bytes(), key).unwrap();
    let msg = if code == "SUCCESS" { "成功" } else { "失败" };
    let body = serde_json::json!({
        "code": code,
        "msg": msg,
        "subCode": sub_code,
        "subMsg": "",
        "timeStamp": "2024-05-20 13:14:00",
        "norce": "8c1f",
        "sign": "",
        "businessData": business_data,
    })
    .to_string();
    if wrap_base64 {
        general_purpose::STANDARD.encode(body).into_bytes()
    } else {
        body.into_bytes()
    }
}
