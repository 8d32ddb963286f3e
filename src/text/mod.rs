//! 文本规范化流水线 (Text Normalizer)
//!
//! 严格顺序：不可见字符 → 繁简转换 → 引号配对 → 全角标点 → 盘古之白。
//! 后续步骤依赖前序步骤已经完成，纯函数，无失败路径。

mod invisible;
mod quotes;
mod script;
mod spacing;
mod width;

use std::sync::{Arc, OnceLock};

pub use invisible::strip_invisible;
pub use quotes::{NormalizationState, pair_quotes};
pub use script::{Identity, ScriptConverter, Simplified};
pub use spacing::{add_spacing, collapse_horizontal_whitespace, is_cjk};
pub use width::{to_fullwidth, widen_punctuation};

/// 规范化器，持有繁简转换服务
#[derive(Clone)]
pub struct Normalizer {
    converter: Arc<dyn ScriptConverter>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Arc::new(Simplified))
    }
}

impl Normalizer {
    pub fn new(converter: Arc<dyn ScriptConverter>) -> Self {
        Self { converter }
    }

    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let text = strip_invisible(text);
        let text = self.converter.convert(&text);

        // 引号与全角映射合并为一次扫描，状态仅属于当前缓冲区
        let mut state = NormalizationState::new();
        let text: String = text
            .chars()
            .map(|c| to_fullwidth(state.convert(c)))
            .collect();

        add_spacing(&text)
    }
}

/// 使用默认 (简体) 转换器规范化文本
pub fn normalize(text: &str) -> String {
    static DEFAULT: OnceLock<Normalizer> = OnceLock::new();
    DEFAULT.get_or_init(Normalizer::default).normalize(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Normalizer {
        Normalizer::new(Arc::new(Identity))
    }

    #[test]
    fn runs_all_steps_in_order() {
        let out = plain().normalize("他说\u{200B}\"Hello世界\",然后(离开)!");
        assert_eq!(out, "他说“Hello 世界”，然后（离开）！");
    }

    #[test]
    fn converts_script_with_default_converter() {
        assert_eq!(normalize("這是第1章"), "这是第 1 章");
    }

    #[test]
    fn normalization_is_idempotent() {
        let n = plain();
        let inputs = [
            "第1章:开始[上]",
            "\"引号\"与'单引号'以及\"未闭合",
            "中文.English-混排/测试",
            "a\u{3000}\u{3000}b\n\n中\u{FEFF}文",
            "",
        ];
        for input in inputs {
            let once = n.normalize(input);
            assert_eq!(n.normalize(&once), once, "{input:?}");
        }
    }

    #[test]
    fn empty_input_is_unchanged() {
        assert_eq!(normalize(""), "");
    }
}
