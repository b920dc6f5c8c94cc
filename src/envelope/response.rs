use crate::error::ApiError;
use serde::{Deserialize, Serialize};

/// 平台响应公共参数。缺失的字段按空串处理。
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResponseEnvelope {
    pub code: String,
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(rename = "subCode")]
    pub sub_code: String,
    #[serde(rename = "subMsg")]
    pub sub_message: String,
    #[serde(rename = "timeStamp")]
    pub timestamp: String,
    // 平台字段名如此拼写
    #[serde(rename = "norce")]
    pub nonce: String,
    #[serde(rename = "sign")]
    pub signature: String,
    #[serde(rename = "businessData")]
    pub business_data: String,
}

impl ResponseEnvelope {
    pub fn is_success(&self, success_code: &str) -> bool {
        self.code == success_code
    }

    pub fn is_sub_success(&self, success_code: &str) -> bool {
        self.sub_code == success_code
    }

    pub fn to_api_error(&self) -> ApiError {
        ApiError {
            code: self.code.clone(),
            message: self.message.clone(),
            sub_code: self.sub_code.clone(),
            sub_message: self.sub_message.clone(),
        }
    }
}
