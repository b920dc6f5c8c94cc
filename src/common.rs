//! 通用模块，包含客户端配置与工具函数

pub mod config;
pub mod utils;

pub use self::config::{ClientConfig, ClientOptions};
pub use self::utils::{SymmetricKey, random_string};
