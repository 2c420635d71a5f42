use thiserror::Error;

/// 编组层自身的错误（公开的序列化 / 反序列化入口从不返回错误）
#[derive(Debug, Error)]
pub enum ErrwireError {
    #[error("serde json error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("property `{key}` expects {expected}")]
    PropertyType {
        key: String,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ErrwireError>;
