/// 批量创建并注册错误类
///
/// ```ignore
/// register_error_classes!(TransportError, DeviceLocked);
/// register_error_classes!(&registry => TransportError, DeviceLocked);
/// ```
#[macro_export]
macro_rules! register_error_classes {
    (
        $( $name:ident ),* $(,)?
    ) => {
        $(
            $crate::registry::create_custom_error_class(stringify!($name));
        )*
    };
    (
        $registry:expr => $( $name:ident ),* $(,)?
    ) => {
        $(
            $registry.create_custom_error_class(stringify!($name));
        )*
    };
}
