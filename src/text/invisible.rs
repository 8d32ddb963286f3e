//! 不可见字符清理 (Invisible Character Pass)

/// 固定替换表：`None` 表示删除，`Some(' ')` 表示折叠为普通空格
const INVISIBLE_CHARS: &[(char, Option<char>)] = &[
    ('\u{00A0}', Some(' ')), // no-break space
    ('\u{200B}', None),      // zero-width space
    ('\u{200C}', None),      // zero-width non-joiner
    ('\u{200D}', None),      // zero-width joiner
    ('\u{2060}', None),      // word joiner
    ('\u{FEFF}', None),      // BOM as text
    ('\u{180E}', None),      // mongolian vowel separator
    ('\u{2000}', Some(' ')),
    ('\u{2001}', Some(' ')),
    ('\u{2002}', Some(' ')),
    ('\u{2003}', Some(' ')),
    ('\u{2004}', Some(' ')),
    ('\u{2005}', Some(' ')),
    ('\u{2006}', Some(' ')),
    ('\u{2007}', Some(' ')),
    ('\u{2008}', Some(' ')),
    ('\u{2009}', Some(' ')),
    ('\u{200A}', Some(' ')),
    ('\u{202F}', Some(' ')),
    ('\u{205F}', Some(' ')),
    ('\u{3000}', Some(' ')), // ideographic space
];

fn replacement(ch: char) -> Option<Option<char>> {
    INVISIBLE_CHARS
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|(_, r)| *r)
}

pub fn strip_invisible(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match replacement(ch) {
            Some(Some(r)) => out.push(r),
            Some(None) => {}
            None => out.push(ch),
        }
    }
    out
}
