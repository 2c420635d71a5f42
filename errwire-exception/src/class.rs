use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::trace;

use errwire_common::StackCapture;

use crate::instance::CustomError;
use crate::stack;
use crate::traits::HasName;

/// 构造选项
#[derive(Debug, Clone, Default)]
pub struct ErrorOptions {
    pub cause: Option<CustomError>,
}

impl ErrorOptions {
    pub fn with_cause(cause: CustomError) -> Self {
        Self { cause: Some(cause) }
    }

    pub fn with_std_cause(cause: &(dyn std::error::Error + 'static)) -> Self {
        Self::with_cause(CustomError::from_std_error(cause))
    }
}

#[derive(Debug)]
struct ClassInner {
    name: String,
    stack_capture: StackCapture,
    /// 内建 Error：空消息不回退为类名
    builtin: bool,
}

/// 错误类（构造器）。克隆廉价，同一次创建的副本视为同一个类
#[derive(Debug, Clone)]
pub struct ErrorClass {
    inner: Arc<ClassInner>,
}

impl ErrorClass {
    pub(crate) fn new(name: impl Into<String>, stack_capture: StackCapture) -> Self {
        Self {
            inner: Arc::new(ClassInner {
                name: name.into(),
                stack_capture,
                builtin: false,
            }),
        }
    }

    pub(crate) fn builtin(name: impl Into<String>, stack_capture: StackCapture) -> Self {
        Self {
            inner: Arc::new(ClassInner {
                name: name.into(),
                stack_capture,
                builtin: true,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// 构造错误实例
    ///
    /// 依次写入 name、message（缺省为类名）、stack，再逐个应用 `fields`
    /// （可覆盖前面的值）。`options.cause` 只在实例尚无 cause 时生效，
    /// 且 cause 带 stack 时把 `"\nCAUSE: "` + cause.stack 追加到自身 stack。
    pub fn construct(
        &self,
        message: Option<&str>,
        fields: Option<&Map<String, Value>>,
        options: Option<ErrorOptions>,
    ) -> CustomError {
        let name = self.name();
        let message = match message {
            Some(m) if !m.is_empty() || self.inner.builtin => m,
            _ if self.inner.builtin => "",
            _ => name,
        };

        let mut err = CustomError::blank(name);
        err.message = message.to_string();
        err.stack = stack::construction_stack(self.inner.stack_capture, name, message);

        for (key, value) in fields.into_iter().flatten() {
            if let Err(e) = err.set_property(key, value.clone()) {
                trace!(kind = name, property = %key, "field not applied: {e}");
            }
        }

        if let Some(cause) = options.and_then(|o| o.cause) {
            if !err.has_cause() {
                if let Some(cause_stack) = cause.stack() {
                    let own = err
                        .stack
                        .take()
                        .unwrap_or_else(|| stack::render_stack(&err.name, &err.message, None));
                    err.stack = Some(format!("{}\nCAUSE: {}", own, cause_stack));
                }
                err.cause = Some(Box::new(cause));
            }
        }

        err
    }

    pub fn new_error(&self, message: impl AsRef<str>) -> CustomError {
        self.construct(Some(message.as_ref()), None, None)
    }

    pub fn with_fields(&self, message: impl AsRef<str>, fields: &Map<String, Value>) -> CustomError {
        self.construct(Some(message.as_ref()), Some(fields), None)
    }

    /// 默认值实例：不跑构造逻辑，供反序列化逐字段填充
    pub fn instantiate(&self) -> CustomError {
        CustomError::blank(self.name())
    }

    /// 按类型名判断，而非按类的身份
    pub fn is_instance<T: HasName + ?Sized>(&self, err: &T) -> bool {
        err.error_name().map_or(false, |n| n == self.name())
    }

    pub fn same_class(&self, other: &ErrorClass) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn class(name: &str) -> ErrorClass {
        ErrorClass::new(name, StackCapture::Auto)
    }

    #[test]
    fn test_message_defaults_to_class_name() {
        let cls = class("DeviceLocked");
        assert_eq!(cls.construct(None, None, None).message(), "DeviceLocked");
        assert_eq!(cls.new_error("").message(), "DeviceLocked");
        assert_eq!(cls.new_error("unlock it").message(), "unlock it");
    }

    #[test]
    fn test_builtin_keeps_empty_message() {
        let base = ErrorClass::builtin("Error", StackCapture::Auto);
        assert_eq!(base.new_error("").message(), "");
        assert_eq!(base.construct(None, None, None).message(), "");
    }

    #[test]
    fn test_fields_are_applied_after_message() {
        let cls = class("HttpError");
        let fields = json!({ "status": 502, "message": "overridden" });
        let err = cls.with_fields("bad gateway", fields.as_object().unwrap());
        assert_eq!(err.message(), "overridden");
        assert_eq!(err.field("status"), Some(&json!(502)));
        assert_eq!(err.name(), "HttpError");
    }

    #[test]
    fn test_cause_appends_stack() {
        let inner = class("Inner").new_error("inner failure");
        let outer = class("Wrapped").construct(Some("outer"), None, Some(ErrorOptions::with_cause(inner.clone())));

        assert_eq!(outer.cause(), Some(&inner));
        let stack = outer.stack().unwrap();
        assert!(stack.starts_with("Wrapped: outer"));
        assert!(stack.contains("\nCAUSE: Inner: inner failure"));
    }

    #[test]
    fn test_existing_cause_field_wins() {
        let fields = json!({ "cause": "from fields" });
        let inner = class("Inner").new_error("x");
        let err = class("Wrapped").construct(None, fields.as_object(), Some(ErrorOptions::with_cause(inner)));
        assert!(err.cause().is_none());
        assert_eq!(err.field("cause"), Some(&json!("from fields")));
        assert!(!err.stack().unwrap().contains("CAUSE:"));
    }

    #[test]
    fn test_cause_without_stack_is_linked_only() {
        let inner = ErrorClass::new("Inner", StackCapture::Never).new_error("x");
        let err = class("Wrapped").construct(None, None, Some(ErrorOptions::with_cause(inner)));
        assert!(err.cause().is_some());
        assert!(!err.stack().unwrap().contains("CAUSE:"));
    }

    #[test]
    fn test_instantiate_and_identity() {
        let cls = class("Quiet");
        let blank = cls.instantiate();
        assert_eq!(blank.name(), "Quiet");
        assert_eq!(blank.message(), "");
        assert!(blank.stack().is_none());
        assert!(cls.is_instance(&blank));
        assert!(cls.same_class(&cls.clone()));
        assert!(!cls.same_class(&class("Quiet")));
    }
}
