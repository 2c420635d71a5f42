// 1. 值模型与能力接口
pub mod value;
pub use value::{ErrorValue, FunctionRef, ObjectRef};

pub mod traits;
pub use traits::{HasCause, HasMessage, HasName, HasStack};

// 2. 公共错误结构
pub mod error;
pub use error::{ErrwireError, Result};

mod stack;

pub mod instance;
pub use instance::CustomError;

pub mod class;
pub use class::{ErrorClass, ErrorOptions};

// 3. 错误注册中心
pub mod registry;
pub use registry::{
    add_custom_error_deserializer, create_custom_error_class, get_error_class, global_registry,
    DeserializerFn, ErrorRegistry, BASE_ERROR_NAME, GLOBAL_ERROR_REGISTRY,
};

// 4. 注册宏
#[macro_use]
pub mod macros;

// 5. 序列化 / 反序列化
pub mod serialize;
pub use serialize::{serialize_error, serialize_error_to_string, PlainError, CIRCULAR_SENTINEL};

pub mod deserialize;
pub use deserialize::{deserialize_error, deserialize_error_from_str};

// 6. 类型匹配与校验
pub mod matcher;
pub use matcher::{cause_chain, find_in_chain, is_kind, match_kind};

pub mod validate;
pub use validate::{is_error_payload, is_known_error_kind};

// 7. 注册表导出
pub mod export;
pub use export::{all_error_classes, ExportedErrorClass};

// 8. 内置错误注册器
pub mod builtin;
pub use builtin::register_all_builtin_errors;

pub use errwire_common::{ErrwireConfig, StackCapture};
