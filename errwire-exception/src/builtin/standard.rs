use crate::registry::{global_registry, ErrorRegistry};

/// 注册 JavaScript 标准错误类型，避免来自 JS 端的错误触发未知类型告警
pub fn register_standard_errors_in(registry: &ErrorRegistry) {
    register_error_classes! {
        registry =>
        TypeError,
        RangeError,
        SyntaxError,
        ReferenceError,
        EvalError,
        URIError,
        AggregateError,
    };
}

pub fn register_standard_errors() {
    register_standard_errors_in(global_registry());
}
