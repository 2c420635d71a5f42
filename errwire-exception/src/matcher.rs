use std::iter;

use crate::instance::CustomError;
use crate::traits::{HasCause, HasName};

/// 匹配最先符合的类型模式（`"*"` 匹配任意类型）
/// kind 可为 `"TypeError"`、`"TransportStatusError"` 等
pub fn match_kind<'a, P: AsRef<str>>(kind: &str, patterns: &'a [P]) -> Option<&'a P> {
    patterns.iter().find(|p| {
        let p = p.as_ref();
        p == "*" || p == kind
    })
}

/// 按类型名判断是否为某种错误
pub fn is_kind<T: HasName + ?Sized>(err: &T, kind: &str) -> bool {
    err.error_name().map_or(false, |n| n == kind)
}

/// 从自身开始沿 cause 链遍历
pub fn cause_chain(err: &CustomError) -> impl Iterator<Item = &CustomError> {
    iter::successors(Some(err), |e| e.error_cause())
}

/// 在 cause 链中查找第一个指定类型的错误
pub fn find_in_chain<'a>(err: &'a CustomError, kind: &str) -> Option<&'a CustomError> {
    cause_chain(err).find(|e| is_kind(*e, kind))
}
