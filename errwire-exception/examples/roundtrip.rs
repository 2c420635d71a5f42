use serde_json::json;
use tracing_subscriber::EnvFilter;

use errwire_exception::{
    add_custom_error_deserializer, create_custom_error_class, deserialize_error_from_str,
    register_all_builtin_errors, serialize_error_to_string, ErrorOptions, ErrorValue, ObjectRef,
};

fn main() -> anyhow::Result<()> {
    // —— 日志初始化 ——
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("errwire_exception=debug".parse()?))
        .with_target(true)
        .init();

    // —— 注册错误类型 ——
    register_all_builtin_errors();
    let transport = create_custom_error_class("TransportStatusError");
    let locked = create_custom_error_class("LockedDeviceError");
    add_custom_error_deserializer("LegacyError", |plain| {
        let reason = plain
            .get("reason")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown reason");
        create_custom_error_class("LegacyError").new_error(reason)
    });

    // 带 cause 与额外字段的错误
    let cause = locked.new_error("device is locked");
    let fields = json!({ "statusCode": 21781 });
    let err = transport.construct(
        Some("APDU exchange failed"),
        fields.as_object(),
        Some(ErrorOptions::with_cause(cause)),
    );

    let text = serialize_error_to_string(&ErrorValue::from(&err))?.unwrap_or_default();
    println!("serialized: {}", text);

    if let Some(restored) = deserialize_error_from_str(&text)? {
        println!("restored:   {} (statusCode={:?})", restored, restored.field("statusCode"));
        if let Some(cause) = restored.cause() {
            println!("  cause:    {}", cause);
        }
    }

    // 含环的对象
    let payload = ObjectRef::new();
    payload.set("name", "RemoteFailure").set("self", payload.clone());
    println!("circular:   {:?}", serialize_error_to_string(&payload.clone().into())?);
    // 拆环后对象才能被释放
    payload.remove("self");

    // 未知类型 + 自定义反序列化
    for raw in [
        r#"{"name":"BrandNewError","message":"from a newer peer"}"#,
        r#"{"name":"LegacyError","reason":"firmware too old"}"#,
    ] {
        if let Some(restored) = deserialize_error_from_str(raw)? {
            println!("restored:   {}", restored);
        }
    }

    Ok(())
}
