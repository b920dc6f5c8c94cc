//! 异步传输，与同步版本行为一致
#![cfg(feature = "async")]

use crate::envelope::{RequestEnvelope, ResponseEnvelope, UploadEnvelope};
use crate::error::Error;
use crate::transport::{FILE_FIELD, TransportError, decode_body, upload_file_name};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use tokio::fs::File;
use tracing::debug;

pub async fn send_json(
    client: &Client,
    url: &str,
    envelope: &RequestEnvelope,
    verbose: bool,
) -> Result<ResponseEnvelope, Error> {
    let body = serde_json::to_vec(envelope).map_err(TransportError::Serialize)?;
    if verbose {
        debug!(url, "request payload: {}", String::from_utf8_lossy(&body));
    }

    let request = client
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body);
    execute(request, verbose).await
}

/// 文件内容以流的形式写入表单，不整体读入内存
pub async fn send_multipart(
    client: &Client,
    url: &str,
    upload: &UploadEnvelope,
    verbose: bool,
) -> Result<ResponseEnvelope, Error> {
    let path = upload.file();
    let file_error = |source| TransportError::File {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).await.map_err(file_error)?;
    let length = file.metadata().await.map_err(file_error)?.len();

    let mut form = Form::new().part(
        FILE_FIELD,
        Part::stream_with_length(file, length).file_name(upload_file_name(path)),
    );
    for (key, value) in upload.envelope.to_form_fields() {
        form = form.text(key, value);
    }
    if verbose {
        debug!(url, file = %path.display(), length, "upload payload: {}", upload.encode());
    }

    execute(client.post(url).multipart(form), verbose).await
}

async fn execute(request: RequestBuilder, verbose: bool) -> Result<ResponseEnvelope, Error> {
    let response = request.send().await.map_err(TransportError::Http)?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(TransportError::Status(status.as_u16()).into());
    }
    let body = response.bytes().await.map_err(TransportError::Http)?;
    Ok(decode_body(&body, verbose)?)
}
