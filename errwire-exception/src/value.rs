//! 序列化入口接受的任意值（可能含环的对象图）

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{Map, Number, Value};

/// JS 中能安全表示为整数的上界（2^53）
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// 函数值：序列化时只保留名字
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionRef {
    name: Option<String>,
}

impl FunctionRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()) }
    }

    pub fn anonymous() -> Self {
        Self { name: None }
    }

    /// 空名字视为匿名
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

/// 可被序列化的任意值
#[derive(Debug, Clone)]
pub enum ErrorValue {
    Undefined,
    Null,
    Bool(bool),
    /// 调用方构造的数值，按 JS 规则输出
    Number(f64),
    /// 来自 JSON 的数值，原样输出
    Json(Number),
    String(String),
    Function(FunctionRef),
    Object(ObjectRef),
}

impl ErrorValue {
    /// 与 JS 的 falsy 判定一致：undefined / null / false / 0 / NaN / ""
    pub fn is_falsy(&self) -> bool {
        match self {
            ErrorValue::Undefined | ErrorValue::Null => true,
            ErrorValue::Bool(b) => !b,
            ErrorValue::Number(n) => *n == 0.0 || n.is_nan(),
            ErrorValue::Json(n) => n.as_f64() == Some(0.0),
            ErrorValue::String(s) => s.is_empty(),
            ErrorValue::Function(_) | ErrorValue::Object(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ErrorValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            ErrorValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// 原始值转 JSON；undefined / 函数 / 对象返回 None
    pub(crate) fn primitive_to_json(&self) -> Option<Value> {
        match self {
            ErrorValue::Null => Some(Value::Null),
            ErrorValue::Bool(b) => Some(Value::Bool(*b)),
            ErrorValue::Number(n) => Some(number_to_json(*n)),
            ErrorValue::Json(n) => Some(Value::Number(n.clone())),
            ErrorValue::String(s) => Some(Value::String(s.clone())),
            ErrorValue::Undefined | ErrorValue::Function(_) | ErrorValue::Object(_) => None,
        }
    }
}

/// 整数值输出为 JSON 整数，非有限值输出为 null（同 JSON.stringify）
fn number_to_json(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

impl From<&str> for ErrorValue {
    fn from(s: &str) -> Self {
        ErrorValue::String(s.to_string())
    }
}

impl From<String> for ErrorValue {
    fn from(s: String) -> Self {
        ErrorValue::String(s)
    }
}

impl From<bool> for ErrorValue {
    fn from(b: bool) -> Self {
        ErrorValue::Bool(b)
    }
}

impl From<f64> for ErrorValue {
    fn from(n: f64) -> Self {
        ErrorValue::Number(n)
    }
}

impl From<i32> for ErrorValue {
    fn from(n: i32) -> Self {
        ErrorValue::Number(f64::from(n))
    }
}

impl From<i64> for ErrorValue {
    fn from(n: i64) -> Self {
        ErrorValue::Number(n as f64)
    }
}

impl From<FunctionRef> for ErrorValue {
    fn from(f: FunctionRef) -> Self {
        ErrorValue::Function(f)
    }
}

impl From<ObjectRef> for ErrorValue {
    fn from(obj: ObjectRef) -> Self {
        ErrorValue::Object(obj)
    }
}

impl From<Value> for ErrorValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ErrorValue::Null,
            Value::Bool(b) => ErrorValue::Bool(b),
            Value::Number(n) => ErrorValue::Json(n),
            Value::String(s) => ErrorValue::String(s),
            // 数组按下标作为自有键，与对象遍历方式一致
            Value::Array(items) => {
                let obj = ObjectRef::new();
                for (idx, item) in items.into_iter().enumerate() {
                    obj.set(idx.to_string(), item);
                }
                ErrorValue::Object(obj)
            }
            Value::Object(map) => ErrorValue::Object(ObjectRef::from(map)),
        }
    }
}

#[derive(Debug)]
struct Property {
    key: String,
    value: ErrorValue,
    enumerable: bool,
}

#[derive(Debug, Default)]
struct Object {
    properties: Vec<Property>,
}

impl Object {
    fn define(&mut self, key: String, value: ErrorValue, enumerable: Option<bool>) {
        match self.properties.iter_mut().find(|p| p.key == key) {
            Some(prop) => {
                prop.value = value;
                if let Some(enumerable) = enumerable {
                    prop.enumerable = enumerable;
                }
            }
            None => self.properties.push(Property {
                key,
                value,
                enumerable: enumerable.unwrap_or(true),
            }),
        }
    }
}

/// 共享对象句柄：同一对象的多个句柄按引用判等，允许构造环
#[derive(Clone, Default)]
pub struct ObjectRef(Arc<RwLock<Object>>);

impl ObjectRef {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Object> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Object> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// 赋值属性：新属性可枚举，已有属性保持原可枚举性
    pub fn set(&self, key: impl Into<String>, value: impl Into<ErrorValue>) -> &Self {
        self.write().define(key.into(), value.into(), None);
        self
    }

    /// 定义不可枚举属性（如原生错误的 message / stack）
    pub fn define_hidden(&self, key: impl Into<String>, value: impl Into<ErrorValue>) -> &Self {
        self.write().define(key.into(), value.into(), Some(false));
        self
    }

    pub fn get(&self, key: &str) -> Option<ErrorValue> {
        self.read()
            .properties
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.clone())
    }

    /// 删除属性；用于拆环，否则环上的对象不会被释放
    pub fn remove(&self, key: &str) -> Option<ErrorValue> {
        let mut obj = self.write();
        let idx = obj.properties.iter().position(|p| p.key == key)?;
        Some(obj.properties.remove(idx).value)
    }

    /// 清空所有属性
    pub fn clear(&self) {
        // 先移出再释放，析构时不持有锁
        let properties = std::mem::take(&mut self.write().properties);
        drop(properties);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read().properties.iter().any(|p| p.key == key)
    }

    /// 自有可枚举键（插入顺序）
    pub fn keys(&self) -> Vec<String> {
        self.read()
            .properties
            .iter()
            .filter(|p| p.enumerable)
            .map(|p| p.key.clone())
            .collect()
    }

    /// 自有可枚举属性的快照；返回后不再持有锁
    pub fn enumerable_entries(&self) -> Vec<(String, ErrorValue)> {
        self.read()
            .properties
            .iter()
            .filter(|p| p.enumerable)
            .map(|p| (p.key.clone(), p.value.clone()))
            .collect()
    }

    pub(crate) fn string_property(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(ErrorValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Map<String, Value>> for ObjectRef {
    fn from(map: Map<String, Value>) -> Self {
        let obj = ObjectRef::new();
        for (key, value) in map {
            obj.set(key, value);
        }
        obj
    }
}

// 对象可能含环，Debug 只输出键
impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef").field("keys", &self.keys()).finish()
    }
}
