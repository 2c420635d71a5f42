use anyhow::{anyhow, Result};
use std::{env, fmt};

/// 调用栈采集策略（控制新建 / 反序列化错误的 stack 字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackCapture {
    /// 跟随 `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`
    #[default]
    Auto,
    /// 始终强制采集
    Always,
    /// 从不采集
    Never,
}

impl StackCapture {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" | "force" => Ok(Self::Always),
            "never" | "off" => Ok(Self::Never),
            other => Err(anyhow!("Unsupported stack capture: {} (use 'auto', 'always' or 'never')", other)),
        }
    }
}

impl fmt::Display for StackCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackCapture::Auto => write!(f, "auto"),
            StackCapture::Always => write!(f, "always"),
            StackCapture::Never => write!(f, "never"),
        }
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("Invalid {}: {} (use 'true' or 'false')", name, other)),
    }
}

/// 错误编组层配置：由 ErrorRegistry 持有
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrwireConfig {
    pub stack_capture: StackCapture,
    /// 反序列化遇到未注册的错误类型时是否输出 warn 日志
    pub warn_on_unknown_kind: bool,
}

impl Default for ErrwireConfig {
    fn default() -> Self {
        Self {
            stack_capture: StackCapture::Auto,
            warn_on_unknown_kind: true,
        }
    }
}

impl ErrwireConfig {
    /// 从环境变量构建配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let stack_capture = match env::var("ERRWIRE_STACK_CAPTURE") {
            Ok(raw) => StackCapture::from_str(&raw)?,
            Err(_) => defaults.stack_capture,
        };

        let warn_on_unknown_kind = match env::var("ERRWIRE_WARN_UNKNOWN") {
            Ok(raw) => parse_flag("ERRWIRE_WARN_UNKNOWN", &raw)?,
            Err(_) => defaults.warn_on_unknown_kind,
        };

        Ok(Self {
            stack_capture,
            warn_on_unknown_kind,
        })
    }

    pub fn with_stack_capture(mut self, stack_capture: StackCapture) -> Self {
        self.stack_capture = stack_capture;
        self
    }

    pub fn with_unknown_kind_warning(mut self, enabled: bool) -> Self {
        self.warn_on_unknown_kind = enabled;
        self
    }

    /// 日志摘要
    pub fn summary(&self) -> String {
        format!(
            "stack_capture={}, warn_on_unknown_kind={}",
            self.stack_capture, self.warn_on_unknown_kind
        )
    }
}
