//! 能力接口：以"是否具备某字段"判断错误形态，而非依赖具体类型

use std::borrow::Cow;

use crate::instance::CustomError;
use crate::value::{ErrorValue, ObjectRef};

pub trait HasName {
    fn error_name(&self) -> Option<Cow<'_, str>>;
}

pub trait HasMessage {
    fn error_message(&self) -> Option<Cow<'_, str>>;
}

pub trait HasStack {
    fn error_stack(&self) -> Option<Cow<'_, str>>;
}

pub trait HasCause {
    fn error_cause(&self) -> Option<&CustomError>;
}

// 对象只有字符串类型的字段才算数
impl HasName for ObjectRef {
    fn error_name(&self) -> Option<Cow<'_, str>> {
        self.string_property("name").map(Cow::Owned)
    }
}

impl HasMessage for ObjectRef {
    fn error_message(&self) -> Option<Cow<'_, str>> {
        self.string_property("message").map(Cow::Owned)
    }
}

impl HasStack for ObjectRef {
    fn error_stack(&self) -> Option<Cow<'_, str>> {
        self.string_property("stack").map(Cow::Owned)
    }
}

impl HasName for ErrorValue {
    fn error_name(&self) -> Option<Cow<'_, str>> {
        self.as_object().and_then(HasName::error_name)
    }
}

impl HasMessage for ErrorValue {
    fn error_message(&self) -> Option<Cow<'_, str>> {
        self.as_object().and_then(HasMessage::error_message)
    }
}

impl HasStack for ErrorValue {
    fn error_stack(&self) -> Option<Cow<'_, str>> {
        self.as_object().and_then(HasStack::error_stack)
    }
}
