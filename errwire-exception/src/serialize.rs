//! 把任意值压平为可跨进程传输的纯数据结构

use serde_json::{Map, Value};

use crate::error::Result;
use crate::instance::CustomError;
use crate::value::{ErrorValue, ObjectRef};

/// 纯数据形态的错误：无环、只含 JSON 值
pub type PlainError = Map<String, Value>;

/// 环引用占位符
pub const CIRCULAR_SENTINEL: &str = "[Circular]";

/// 即使不可枚举也要保留的字段
const PRESERVED_KEYS: [&str; 3] = ["name", "message", "stack"];

/// 序列化任意值
///
/// - falsy 值原样返回（undefined 对应 `None`）
/// - 函数 → `"[Function: <name>]"`
/// - 对象 → 去环后的 [`PlainError`]
/// - 其余原始值原样返回
pub fn serialize_error(value: &ErrorValue) -> Option<Value> {
    if value.is_falsy() {
        return value.primitive_to_json();
    }
    match value {
        ErrorValue::Object(obj) => Some(Value::Object(destroy_circular(obj, &[]))),
        ErrorValue::Function(f) => Some(Value::String(format!(
            "[Function: {}]",
            f.name().unwrap_or("anonymous")
        ))),
        other => other.primitive_to_json(),
    }
}

/// 序列化并编码为 JSON 文本；undefined 返回 `None`
pub fn serialize_error_to_string(value: &ErrorValue) -> Result<Option<String>> {
    serialize_error(value)
        .map(|plain| serde_json::to_string(&plain))
        .transpose()
        .map_err(Into::into)
}

/// `seen` 只记录从根到当前节点的路径，兄弟分支互不影响
fn destroy_circular(from: &ObjectRef, seen: &[ObjectRef]) -> PlainError {
    let mut path = seen.to_vec();
    path.push(from.clone());

    let mut to = PlainError::new();
    for (key, value) in from.enumerable_entries() {
        match value {
            ErrorValue::Function(_) | ErrorValue::Undefined => continue,
            ErrorValue::Object(child) => {
                let flattened = if path.iter().any(|s| s.ptr_eq(&child)) {
                    Value::String(CIRCULAR_SENTINEL.to_string())
                } else {
                    Value::Object(destroy_circular(&child, &path))
                };
                to.insert(key, flattened);
            }
            primitive => {
                if let Some(json) = primitive.primitive_to_json() {
                    to.insert(key, json);
                }
            }
        }
    }

    for key in PRESERVED_KEYS {
        if let Some(s) = from.string_property(key) {
            to.insert(key.to_string(), Value::String(s));
        }
    }
    to
}

impl CustomError {
    /// 直接序列化错误实例（含 cause 链）
    pub fn to_plain(&self) -> PlainError {
        match ErrorValue::from(self) {
            ErrorValue::Object(obj) => destroy_circular(&obj, &[]),
            _ => PlainError::new(),
        }
    }
}
