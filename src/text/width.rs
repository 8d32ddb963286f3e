//! 半角 → 全角标点映射 (Width Conversion)
//!
//! 引号不在表中，已由配对状态机处理。

pub fn to_fullwidth(ch: char) -> char {
    match ch {
        '!' => '！',
        '(' => '（',
        ')' => '）',
        ',' => '，',
        ':' => '：',
        ';' => '；',
        '?' => '？',
        '[' => '【',
        ']' => '】',
        other => other,
    }
}

pub fn widen_punctuation(text: &str) -> String {
    text.chars().map(to_fullwidth).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_table_entries_only() {
        assert_eq!(widen_punctuation("a!(b),c:d;e?[f]"), "a！（b），c：d；e？【f】");
        assert_eq!(widen_punctuation("\"'.-/"), "\"'.-/");
    }
}
