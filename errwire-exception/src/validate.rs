use serde_json::Value;

use crate::registry::{ErrorRegistry, BASE_ERROR_NAME, GLOBAL_ERROR_REGISTRY};

impl ErrorRegistry {
    /// 类型名是否能在不触发动态建类的情况下被反序列化
    pub fn is_known_kind(&self, name: &str) -> bool {
        name == BASE_ERROR_NAME || self.has_custom_deserializer(name) || self.error_class(name).is_some()
    }
}

/// 判断类型名是否已注册（全局注册中心）
pub fn is_known_error_kind(name: &str) -> bool {
    GLOBAL_ERROR_REGISTRY.is_known_kind(name)
}

/// 是否为反序列化后能得到错误实例的对象（带字符串 name 或 message）
pub fn is_error_payload(value: &Value) -> bool {
    value.as_object().map_or(false, |obj| {
        ["name", "message"]
            .iter()
            .any(|key| obj.get(*key).map_or(false, Value::is_string))
    })
}
