use std::io;
use std::sync::{Arc, Mutex};

use errwire_exception::{ErrorRegistry, ErrwireConfig, StackCapture};
use serde_json::json;

/// 收集日志输出的内存缓冲
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// 在线程局部 subscriber 下执行，返回 WARN 及以上的日志文本
fn capture_warnings<F: FnOnce()>(f: F) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

fn registry(warn: bool) -> ErrorRegistry {
    ErrorRegistry::new(
        ErrwireConfig::default()
            .with_stack_capture(StackCapture::Never)
            .with_unknown_kind_warning(warn),
    )
}

#[test]
fn test_unknown_kind_warns_by_default() {
    let registry = registry(true);
    let logs = capture_warnings(|| {
        let err = registry
            .deserialize_error(&json!({ "name": "LogKindLoud", "message": "m" }))
            .unwrap();
        assert_eq!(err.name(), "LogKindLoud");
    });

    assert!(
        logs.contains("deserializing an unknown class 'LogKindLoud'"),
        "missing warning in: {}",
        logs
    );
    assert!(logs.contains("WARN"));
}

#[test]
fn test_unknown_kind_warning_can_be_disabled() {
    let registry = registry(false);
    let logs = capture_warnings(|| {
        let err = registry
            .deserialize_error(&json!({ "name": "LogKindQuiet", "message": "m" }))
            .unwrap();
        assert_eq!(err.name(), "LogKindQuiet");
    });

    assert!(!logs.contains("unknown class"), "unexpected warning: {}", logs);
    assert!(registry.is_known_kind("LogKindQuiet"));
}

#[test]
fn test_known_kind_does_not_warn() {
    let registry = registry(true);
    registry.create_custom_error_class("LogKindKnown");
    let logs = capture_warnings(|| {
        registry.deserialize_error(&json!({ "name": "LogKindKnown", "message": "m" }));
        registry.deserialize_error(&json!({ "name": "Error", "message": "m" }));
    });

    assert!(!logs.contains("unknown class"), "unexpected warning: {}", logs);
}
