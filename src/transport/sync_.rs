//! 同步传输：JSON 请求与 multipart 文件上传

use crate::envelope::{RequestEnvelope, ResponseEnvelope, UploadEnvelope};
use crate::error::Error;
use crate::transport::{FILE_FIELD, TransportError, decode_body, upload_file_name};
use reqwest::StatusCode;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};
use std::fs::File;
use tracing::debug;

/// 以 `application/json` 发送信封
pub fn send_json(
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
    execute(request, verbose)
}

/// 以 `multipart/form-data` 上传文件，信封字段逐项作为表单字段。
///
/// 文件句柄随表单一起在请求结束时释放，任何出错路径都不会遗留打开的文件。
pub fn send_multipart(
    client: &Client,
    url: &str,
    upload: &UploadEnvelope,
    verbose: bool,
) -> Result<ResponseEnvelope, Error> {
    let path = upload.file();
    let file = File::open(path).map_err(|source| TransportError::File {
        path: path.to_path_buf(),
        source,
    })?;
    let length = file
        .metadata()
        .map_err(|source| TransportError::File {
            path: path.to_path_buf(),
            source,
        })?
        .len();

    let mut form = Form::new().part(
        FILE_FIELD,
        Part::reader_with_length(file, length).file_name(upload_file_name(path)),
    );
    for (key, value) in upload.envelope.to_form_fields() {
        form = form.text(key, value);
    }
    if verbose {
        debug!(url, file = %path.display(), length, "upload payload: {}", upload.encode());
    }

    execute(client.post(url).multipart(form), verbose)
}

fn execute(request: RequestBuilder, verbose: bool) -> Result<ResponseEnvelope, Error> {
    let response = request.send().map_err(TransportError::Http)?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(TransportError::Status(status.as_u16()).into());
    }
    let body = response.bytes().map_err(TransportError::Http)?;
    Ok(decode_body(&body, verbose)?)
}
