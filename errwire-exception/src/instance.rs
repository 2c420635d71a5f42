use std::borrow::Cow;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::{ErrwireError, Result};
use crate::traits::{HasCause, HasMessage, HasName, HasStack};
use crate::value::{ErrorValue, ObjectRef};

/// 错误实例：类型名 + 消息 + 可选调用栈 + 独占的 cause 链 + 额外字段
#[derive(Debug, Clone, PartialEq)]
pub struct CustomError {
    pub(crate) name: String,
    pub(crate) message: String,
    pub(crate) stack: Option<String>,
    pub(crate) cause: Option<Box<CustomError>>,
    pub(crate) fields: Map<String, Value>,
}

impl CustomError {
    /// 默认值实例，不经过构造逻辑
    pub(crate) fn blank(name: &str) -> Self {
        Self {
            name: name.to_string(),
            message: String::new(),
            stack: None,
            cause: None,
            fields: Map::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    pub fn cause(&self) -> Option<&CustomError> {
        self.cause.as_deref()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// cause 既可能是错误链，也可能是字段里的任意值
    pub fn has_cause(&self) -> bool {
        self.cause.is_some() || self.fields.contains_key("cause")
    }

    pub fn set_cause(&mut self, cause: CustomError) {
        self.fields.remove("cause");
        self.cause = Some(Box::new(cause));
    }

    /// 按键写入属性
    ///
    /// `name` / `message` 只接受字符串，`stack` 接受字符串或 null，
    /// 其余键（包括非错误对象的 `cause`）进入额外字段。
    pub fn set_property(&mut self, key: &str, value: Value) -> Result<()> {
        match key {
            "name" => self.name = expect_string(key, value)?,
            "message" => self.message = expect_string(key, value)?,
            "stack" => {
                self.stack = match value {
                    Value::Null => None,
                    other => Some(expect_string(key, other)?),
                }
            }
            "cause" => {
                self.cause = None;
                self.fields.insert(key.to_string(), value);
            }
            _ => {
                self.fields.insert(key.to_string(), value);
            }
        }
        Ok(())
    }

    /// 把 Rust 原生错误及其 `source()` 链转换为错误链
    pub fn from_std_error(err: &(dyn std::error::Error + 'static)) -> Self {
        if let Some(custom) = err.downcast_ref::<CustomError>() {
            return custom.clone();
        }
        let mut out = Self::blank(crate::registry::BASE_ERROR_NAME);
        out.message = err.to_string();
        out.cause = err
            .source()
            .map(|source| Box::new(Self::from_std_error(source)));
        out
    }
}

fn expect_string(key: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(ErrwireError::PropertyType {
            key: key.to_string(),
            expected: "a string",
        }),
    }
}

impl fmt::Display for CustomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.message)
        }
    }
}

impl std::error::Error for CustomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl HasName for CustomError {
    fn error_name(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.name))
    }
}

impl HasMessage for CustomError {
    fn error_message(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.message))
    }
}

impl HasStack for CustomError {
    fn error_stack(&self) -> Option<Cow<'_, str>> {
        self.stack.as_deref().map(Cow::Borrowed)
    }
}

impl HasCause for CustomError {
    fn error_cause(&self) -> Option<&CustomError> {
        self.cause()
    }
}

/// 转为对象图：`name`、额外字段与 `cause` 可枚举，`message` / `stack` 不可枚举
impl From<&CustomError> for ErrorValue {
    fn from(err: &CustomError) -> Self {
        let obj = ObjectRef::new();
        obj.set("name", err.name.as_str());
        obj.define_hidden("message", err.message.as_str());
        if let Some(stack) = &err.stack {
            obj.define_hidden("stack", stack.as_str());
        }
        for (key, value) in &err.fields {
            obj.set(key.as_str(), value.clone());
        }
        if let Some(cause) = &err.cause {
            obj.set("cause", ErrorValue::from(cause.as_ref()));
        }
        ErrorValue::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::error::Error as _;

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "disk unplugged")
        }
    }

    impl std::error::Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "write failed")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_set_property_routes_reserved_keys() {
        let mut err = CustomError::blank("Boom");
        err.set_property("message", json!("hello")).unwrap();
        err.set_property("stack", json!("Boom: hello")).unwrap();
        err.set_property("statusCode", json!(404)).unwrap();

        assert_eq!(err.message(), "hello");
        assert_eq!(err.stack(), Some("Boom: hello"));
        assert_eq!(err.field("statusCode"), Some(&json!(404)));

        let failed = err.set_property("name", json!(42));
        assert!(matches!(failed, Err(ErrwireError::PropertyType { .. })));
        assert_eq!(err.name(), "Boom");

        err.set_property("stack", Value::Null).unwrap();
        assert!(err.stack().is_none());
    }

    #[test]
    fn test_non_error_cause_lands_in_fields() {
        let mut err = CustomError::blank("Boom");
        err.set_property("cause", json!("[Circular]")).unwrap();
        assert!(err.cause().is_none());
        assert!(err.has_cause());

        err.set_cause(CustomError::blank("Inner"));
        assert!(err.field("cause").is_none());
        assert_eq!(err.cause().unwrap().name(), "Inner");
    }

    #[test]
    fn test_from_std_error_keeps_source_chain() {
        let err = CustomError::from_std_error(&Outer(Inner));
        assert_eq!(err.name(), "Error");
        assert_eq!(err.message(), "write failed");
        assert_eq!(err.cause().unwrap().message(), "disk unplugged");
        assert_eq!(err.source().unwrap().to_string(), "Error: disk unplugged");
    }

    #[test]
    fn test_display() {
        let mut err = CustomError::blank("Timeout");
        assert_eq!(err.to_string(), "Timeout");
        err.message = "too slow".into();
        assert_eq!(err.to_string(), "Timeout: too slow");
    }
}
