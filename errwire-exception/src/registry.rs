use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;
use tracing::debug;

use errwire_common::ErrwireConfig;

use crate::class::ErrorClass;
use crate::instance::CustomError;
use crate::serialize::PlainError;

/// 内建基础错误类型名
pub const BASE_ERROR_NAME: &str = "Error";

/// 自定义反序列化函数：完全接管某个类型名的重建
pub type DeserializerFn = Arc<dyn Fn(&PlainError) -> CustomError + Send + Sync>;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// 错误类注册中心：类型名 → 构造器，类型名 → 自定义反序列化函数
///
/// 重复注册同名条目时后者覆盖前者，不报错。
pub struct ErrorRegistry {
    config: ErrwireConfig,
    base: ErrorClass,
    classes: RwLock<HashMap<String, ErrorClass>>,
    deserializers: RwLock<HashMap<String, DeserializerFn>>,
}

impl ErrorRegistry {
    pub fn new(config: ErrwireConfig) -> Self {
        let base = ErrorClass::builtin(BASE_ERROR_NAME, config.stack_capture);
        Self {
            config,
            base,
            classes: RwLock::new(HashMap::new()),
            deserializers: RwLock::new(HashMap::new()),
        }
    }

    /// 使用环境变量中的配置创建
    pub fn from_env() -> anyhow::Result<Self> {
        let config = ErrwireConfig::from_env()?;
        debug!(config = %config.summary(), "error registry configured from env");
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ErrwireConfig {
        &self.config
    }

    /// 内建 `Error` 类
    pub fn base_class(&self) -> &ErrorClass {
        &self.base
    }

    /// 创建并注册错误类
    pub fn create_custom_error_class(&self, name: &str) -> ErrorClass {
        let class = ErrorClass::new(name, self.config.stack_capture);
        let replaced = write(&self.classes)
            .insert(name.to_string(), class.clone())
            .is_some();
        debug!(kind = name, replaced, "error class registered");
        class
    }

    /// 注册自定义反序列化函数
    pub fn add_custom_error_deserializer<F>(&self, name: &str, deserializer: F)
    where
        F: Fn(&PlainError) -> CustomError + Send + Sync + 'static,
    {
        let replaced = write(&self.deserializers)
            .insert(name.to_string(), Arc::new(deserializer))
            .is_some();
        debug!(kind = name, replaced, "custom error deserializer registered");
    }

    /// 查询已注册的错误类（不含内建 `Error`）
    pub fn error_class(&self, name: &str) -> Option<ErrorClass> {
        read(&self.classes).get(name).cloned()
    }

    /// 反序列化使用的构造器：`Error` 永远对应内建类
    pub(crate) fn constructor_for(&self, name: &str) -> Option<ErrorClass> {
        if name == BASE_ERROR_NAME {
            return Some(self.base.clone());
        }
        self.error_class(name)
    }

    pub fn custom_deserializer(&self, name: &str) -> Option<DeserializerFn> {
        read(&self.deserializers).get(name).cloned()
    }

    pub fn has_custom_deserializer(&self, name: &str) -> bool {
        read(&self.deserializers).contains_key(name)
    }

    /// 已注册的错误类名
    pub fn class_names(&self) -> Vec<String> {
        read(&self.classes).keys().cloned().collect()
    }

    pub(crate) fn deserializer_names(&self) -> Vec<String> {
        read(&self.deserializers).keys().cloned().collect()
    }
}

impl Default for ErrorRegistry {
    fn default() -> Self {
        Self::new(ErrwireConfig::default())
    }
}

impl fmt::Debug for ErrorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorRegistry")
            .field("config", &self.config)
            .field("classes", &self.class_names())
            .field("deserializers", &self.deserializer_names())
            .finish()
    }
}

/// 进程级默认注册中心
pub static GLOBAL_ERROR_REGISTRY: Lazy<ErrorRegistry> = Lazy::new(ErrorRegistry::default);

pub fn global_registry() -> &'static ErrorRegistry {
    &GLOBAL_ERROR_REGISTRY
}

pub fn create_custom_error_class(name: &str) -> ErrorClass {
    GLOBAL_ERROR_REGISTRY.create_custom_error_class(name)
}

pub fn add_custom_error_deserializer<F>(name: &str, deserializer: F)
where
    F: Fn(&PlainError) -> CustomError + Send + Sync + 'static,
{
    GLOBAL_ERROR_REGISTRY.add_custom_error_deserializer(name, deserializer)
}

pub fn get_error_class(name: &str) -> Option<ErrorClass> {
    GLOBAL_ERROR_REGISTRY.error_class(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_registry_basic_operations() {
        let registry = ErrorRegistry::default();

        let class = registry.create_custom_error_class("LedgerLocked");
        assert_eq!(class.name(), "LedgerLocked");
        assert!(registry.error_class("LedgerLocked").unwrap().same_class(&class));
        assert!(registry.error_class("Nope").is_none());

        // 内建 Error 不在注册表里，但总能作为构造器
        assert!(registry.error_class(BASE_ERROR_NAME).is_none());
        assert!(registry.constructor_for(BASE_ERROR_NAME).unwrap().same_class(registry.base_class()));
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = ErrorRegistry::default();
        let first = registry.create_custom_error_class("Dup");
        let second = registry.create_custom_error_class("Dup");

        let current = registry.error_class("Dup").unwrap();
        assert!(current.same_class(&second));
        assert!(!current.same_class(&first));
        assert_eq!(registry.class_names(), vec!["Dup".to_string()]);

        registry.add_custom_error_deserializer("Dup", |_| CustomError::blank("first"));
        registry.add_custom_error_deserializer("Dup", |_| CustomError::blank("second"));
        let des = registry.custom_deserializer("Dup").unwrap();
        assert_eq!(des(&PlainError::new()).name(), "second");
    }

    #[test]
    fn test_registered_error_class_overrides_nothing_for_base() {
        let registry = ErrorRegistry::default();
        let shadow = registry.create_custom_error_class(BASE_ERROR_NAME);
        let ctor = registry.constructor_for(BASE_ERROR_NAME).unwrap();
        assert!(!ctor.same_class(&shadow));
        assert!(ctor.same_class(registry.base_class()));
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Arc::new(ErrorRegistry::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry.create_custom_error_class(&format!("Kind{}", i));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.class_names().len(), 8);
    }

    #[test]
    fn test_global_helpers() {
        let class = create_custom_error_class("RegistryTestGlobalKind");
        assert!(get_error_class("RegistryTestGlobalKind").unwrap().same_class(&class));
        assert!(std::ptr::eq(global_registry(), &*GLOBAL_ERROR_REGISTRY));
    }
}
