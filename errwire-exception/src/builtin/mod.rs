pub mod standard;

pub use standard::{register_standard_errors, register_standard_errors_in};

/// 注册所有内置错误类型
pub fn register_all_builtin_errors() {
    register_standard_errors();
}
