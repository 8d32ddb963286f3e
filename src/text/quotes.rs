//! 引号配对状态机 (Quote Pairing)
//!
//! 单遍扫描，双引号与单引号各自独立翻转。不做嵌套感知，也不修复错配：
//! 奇数个引号会在结尾留下一个开引号。

/// 单个文本缓冲区的引号奇偶状态，每个缓冲区重新创建
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NormalizationState {
    pub in_double_quote: bool,
    pub in_single_quote: bool,
}

impl NormalizationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn convert(&mut self, ch: char) -> char {
        match ch {
            '"' => {
                self.in_double_quote = !self.in_double_quote;
                if self.in_double_quote { '“' } else { '”' }
            }
            '\'' => {
                self.in_single_quote = !self.in_single_quote;
                if self.in_single_quote { '‘' } else { '’' }
            }
            other => other,
        }
    }
}

pub fn pair_quotes(text: &str) -> String {
    let mut state = NormalizationState::new();
    text.chars().map(|c| state.convert(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(text: &str, target: char) -> usize {
        text.chars().filter(|c| *c == target).count()
    }

    #[test]
    fn alternates_open_and_close() {
        assert_eq!(pair_quotes(r#"他说"你好"然后"再见""#), "他说“你好”然后“再见”");
        assert_eq!(pair_quotes("it's 'fine'"), "it‘s ’fine‘");
    }

    #[test]
    fn odd_count_leaves_dangling_open_quote() {
        let out = pair_quotes(r#""a" "b"#);
        assert_eq!(out, "“a” “b");
    }

    #[test]
    fn counts_are_preserved_per_kind() {
        let inputs = [
            r#"""""#,
            r#"a"b'c"d'e"f"#,
            r#"'''"#,
            "没有引号",
            r#"混合"中文'和"English'"#,
        ];
        for input in inputs {
            let out = pair_quotes(input);
            let doubles = count(input, '"');
            let singles = count(input, '\'');
            let opens = count(&out, '“');
            let closes = count(&out, '”');
            assert_eq!(opens + closes, doubles, "{input}");
            assert_eq!(opens, doubles.div_ceil(2), "{input}");
            assert_eq!(count(&out, '‘') + count(&out, '’'), singles, "{input}");

            let sequence: Vec<char> = out.chars().filter(|c| matches!(c, '“' | '”')).collect();
            for (i, c) in sequence.iter().enumerate() {
                let expected = if i % 2 == 0 { '“' } else { '”' };
                assert_eq!(*c, expected, "{input}");
            }
        }
    }

    #[test]
    fn state_is_scoped_to_one_buffer() {
        let first = pair_quotes(r#"开始"未闭合"#);
        let second = pair_quotes(r#""新的""#);
        assert_eq!(first, "开始“未闭合");
        assert_eq!(second, "“新的”");
    }
}
