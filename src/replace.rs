//! 置換テキストのキャプチャグループ展開

use regex::Captures;

/// 置換テキスト中の `$N`（N は1桁の数字）をキャプチャグループ N の
/// 内容で展開する
///
/// 参加しなかったグループは空文字列になる。数字が続かない `$` は
/// リテラルの `$` として残す。
pub fn expand_captures(captures: &Captures<'_>, template: &str) -> String {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            output.push(ch);
            continue;
        }

        match chars.peek() {
            Some(&digit) if digit.is_ascii_digit() => {
                chars.next();
                let index = (digit as u8 - b'0') as usize;
                if let Some(group) = captures.get(index) {
                    output.push_str(group.as_str());
                }
            }
            _ => output.push('$'),
        }
    }

    output
}
