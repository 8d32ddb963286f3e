//! 繁简转换 (Script Conversion)
//!
//! 字符级映射表由 `zhconv` 提供，这里只定义调用接口。

use zhconv::{Variant, zhconv};

/// 繁体 → 简体转换服务
pub trait ScriptConverter: Send + Sync {
    fn convert(&self, text: &str) -> String;
}

/// 基于 zhconv 的简体转换
#[derive(Debug, Default, Clone, Copy)]
pub struct Simplified;

impl ScriptConverter for Simplified {
    fn convert(&self, text: &str) -> String {
        zhconv(text, Variant::ZhHans)
    }
}

/// 原样返回，用于禁用转换
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl ScriptConverter for Identity {
    fn convert(&self, text: &str) -> String {
        text.to_string()
    }
}
