//! 请求与响应信封

pub mod request;
pub mod response;

pub use self::request::{CHARSET, EnvelopeBuilder, RequestEnvelope, UploadEnvelope};
pub use self::response::ResponseEnvelope;
