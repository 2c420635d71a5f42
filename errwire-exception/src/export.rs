use serde::Serialize;

use crate::registry::{ErrorRegistry, GLOBAL_ERROR_REGISTRY};

/// 可序列化的导出结构
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedErrorClass {
    pub name: String,
    pub has_custom_deserializer: bool,
}

impl ErrorRegistry {
    /// 已注册的错误类与自定义反序列化函数，按类型名排序
    pub fn export(&self) -> Vec<ExportedErrorClass> {
        let mut names = self.class_names();
        names.extend(self.deserializer_names());
        names.sort();
        names.dedup();

        names
            .into_iter()
            .map(|name| ExportedErrorClass {
                has_custom_deserializer: self.has_custom_deserializer(&name),
                name,
            })
            .collect()
    }
}

/// 返回全局注册中心中的所有错误类型
pub fn all_error_classes() -> Vec<ExportedErrorClass> {
    GLOBAL_ERROR_REGISTRY.export()
}
