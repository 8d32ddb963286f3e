//! 盘古之白 (Script-boundary Spacing)
//!
//! 在中文字符与相邻的英文字母、数字、ASCII 标点之间插入一个空格，
//! 随后折叠连续的水平空白 (保留换行)。

/// CJK 统一表意文字基本区
pub fn is_cjk(ch: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&ch)
}

fn is_latin_or_punct(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch.is_ascii_punctuation()
}

fn needs_gap(prev: char, next: char) -> bool {
    (is_cjk(prev) && is_latin_or_punct(next)) || (is_latin_or_punct(prev) && is_cjk(next))
}

pub fn add_spacing(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut spaced = String::with_capacity(text.len() + text.len() / 8);
    let mut prev: Option<char> = None;
    for ch in text.chars() {
        if let Some(p) = prev
            && needs_gap(p, ch)
        {
            spaced.push(' ');
        }
        spaced.push(ch);
        prev = Some(ch);
    }

    collapse_horizontal_whitespace(&spaced)
}

/// 将连续的空格/制表符折叠为一个空格
pub fn collapse_horizontal_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for ch in text.chars() {
        if ch == ' ' || ch == '\t' {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}
