//! 从纯数据重建错误实例

use std::borrow::Cow;

use serde_json::Value;
use tracing::{trace, warn};

use crate::error::Result;
use crate::instance::CustomError;
use crate::registry::{ErrorRegistry, GLOBAL_ERROR_REGISTRY};
use crate::serialize::PlainError;
use crate::stack;

impl ErrorRegistry {
    /// 反序列化错误
    ///
    /// - `None`（undefined）或非对象值 → `Error(String(value))`
    /// - 对象：先尝试解开 message 中二次编码的错误，再按 `name` 选择
    ///   自定义反序列化函数 / 已注册的类 / 动态创建的新类；没有 `name`
    ///   但有 `message` 时构造内建 `Error`；两者都没有时返回 `None`
    pub fn deserialize_error<'a>(&self, value: impl Into<Option<&'a Value>>) -> Option<CustomError> {
        let object = match value.into() {
            Some(Value::Object(map)) => map,
            // 数组没有 name / message
            Some(Value::Array(_)) => return None,
            other => return Some(self.base_class().new_error(js_string(other))),
        };

        let working = unwrap_encoded(object);

        let error = if let Some(name) = working.get("name").and_then(Value::as_str) {
            Some(self.reconstruct(name, &working))
        } else {
            working
                .get("message")
                .and_then(Value::as_str)
                .map(|message| self.base_class().new_error(message))
        };

        error.map(|mut err| {
            if err.stack.is_none() {
                err.stack = stack::call_site_stack(self.config().stack_capture, &err.name, &err.message);
            }
            err
        })
    }

    fn reconstruct(&self, name: &str, working: &PlainError) -> CustomError {
        if let Some(deserializer) = self.custom_deserializer(name) {
            return deserializer(working);
        }

        let class = match self.constructor_for(name) {
            Some(class) => class,
            None => {
                if self.config().warn_on_unknown_kind {
                    warn!("⚠️ deserializing an unknown class '{}'", name);
                }
                self.create_custom_error_class(name)
            }
        };

        let mut error = class.instantiate();
        for (key, value) in working {
            let copied = match (key.as_str(), value) {
                ("cause", Value::Object(_)) => match self.deserialize_error(value) {
                    Some(cause) => {
                        error.set_cause(cause);
                        Ok(())
                    }
                    None => error.set_property(key, value.clone()),
                },
                _ => error.set_property(key, value.clone()),
            };
            // 单个字段失败不影响其余字段
            if let Err(e) = copied {
                trace!(kind = name, property = %key, "property skipped: {e}");
            }
        }
        error
    }

    /// 解析 JSON 文本后反序列化
    pub fn deserialize_error_from_str(&self, text: &str) -> Result<Option<CustomError>> {
        let value: Value = serde_json::from_str(text)?;
        Ok(self.deserialize_error(&value))
    }
}

/// message 本身是一个完整错误的 JSON 编码时，改用内层结构
fn unwrap_encoded(object: &PlainError) -> Cow<'_, PlainError> {
    if let Some(Value::String(message)) = object.get("message") {
        if let Ok(Value::Object(inner)) = serde_json::from_str::<Value>(message) {
            if non_empty_str(inner.get("message")) && non_empty_str(inner.get("name")) {
                return Cow::Owned(inner);
            }
        }
    }
    Cow::Borrowed(object)
}

fn non_empty_str(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if !s.is_empty())
}

/// 与 JS `String(value)` 对非对象值的结果一致
fn js_string(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn deserialize_error<'a>(value: impl Into<Option<&'a Value>>) -> Option<CustomError> {
    GLOBAL_ERROR_REGISTRY.deserialize_error(value)
}

pub fn deserialize_error_from_str(text: &str) -> Result<Option<CustomError>> {
    GLOBAL_ERROR_REGISTRY.deserialize_error_from_str(text)
}
