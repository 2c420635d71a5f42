use std::backtrace::{Backtrace, BacktraceStatus};

use errwire_common::StackCapture;

/// 按策略采集当前调用栈；未真正采集到帧时返回 None
pub(crate) fn capture_frames(mode: StackCapture) -> Option<String> {
    let backtrace = match mode {
        StackCapture::Never => return None,
        StackCapture::Auto => Backtrace::capture(),
        StackCapture::Always => Backtrace::force_capture(),
    };
    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    }
}

/// `Name: message` 首行，后接调用栈帧
pub(crate) fn render_stack(name: &str, message: &str, frames: Option<&str>) -> String {
    let header = if message.is_empty() {
        name.to_string()
    } else {
        format!("{}: {}", name, message)
    };
    match frames {
        Some(frames) => format!("{}\n{}", header, frames.trim_end()),
        None => header,
    }
}

/// 构造错误时的 stack，首行总是存在（Never 除外）
pub(crate) fn construction_stack(mode: StackCapture, name: &str, message: &str) -> Option<String> {
    if mode == StackCapture::Never {
        return None;
    }
    Some(render_stack(name, message, capture_frames(mode).as_deref()))
}

/// 反序列化结果补充的 stack：只在确实采集到帧时附加
pub(crate) fn call_site_stack(mode: StackCapture, name: &str, message: &str) -> Option<String> {
    capture_frames(mode).map(|frames| render_stack(name, message, Some(&frames)))
}
