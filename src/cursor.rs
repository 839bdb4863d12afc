//! マッチカーソル
//!
//! クエリを手掛かりに、バッファテキストのスナップショット上を前後へ
//! 探索するカーソル。位置はすべて文字インデックスで扱う。

use crate::query::Query;

/// 1件のマッチ範囲（文字インデックス、終端は排他的）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSpan {
    /// マッチ開始位置
    pub start: usize,
    /// マッチ終了位置（排他的）
    pub end: usize,
}

impl MatchSpan {
    /// 範囲を作成
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// マッチ長（文字数）
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// 幅ゼロの範囲か判定
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// 位置を保持しながらマッチを順に辿るカーソル
///
/// `find_next` は探索位置以降で最初に始まるマッチ、`find_prev` は
/// 探索位置以前で終わる最後のマッチを返す。幅ゼロのマッチは
/// 1文字先へ進んで探し直すため、返る範囲は常に1文字以上あり、
/// 走査が停滞しない。
#[derive(Debug)]
pub struct MatchCursor<'a> {
    text: &'a str,
    query: &'a Query,
    pos: usize,
    current: Option<MatchSpan>,
}

impl<'a> MatchCursor<'a> {
    /// 指定位置から探索するカーソルを作成
    pub fn new(text: &'a str, query: &'a Query, from: usize) -> Self {
        Self {
            text,
            query,
            pos: from,
            current: None,
        }
    }

    /// 直近に返したマッチ
    pub fn current(&self) -> Option<MatchSpan> {
        self.current
    }

    /// 方向を指定してマッチを探す
    pub fn find(&mut self, reverse: bool) -> Option<MatchSpan> {
        if reverse {
            self.find_prev()
        } else {
            self.find_next()
        }
    }

    /// 次のマッチへ進む
    pub fn find_next(&mut self) -> Option<MatchSpan> {
        let found = next_match(self.query, self.text, self.pos)?;
        self.pos = found.end;
        self.current = Some(found);
        Some(found)
    }

    /// 前のマッチへ戻る
    pub fn find_prev(&mut self) -> Option<MatchSpan> {
        let found = prev_match(self.query, self.text, self.pos)?;
        self.pos = found.start;
        self.current = Some(found);
        Some(found)
    }
}

/// `from` 以降で最初に始まる、幅1文字以上のマッチ
fn next_match(query: &Query, text: &str, from: usize) -> Option<MatchSpan> {
    if query.is_empty() {
        return None;
    }

    match query.regex() {
        Some(regex) => {
            if from > text.chars().count() {
                return None;
            }
            let mut from_byte = char_to_byte_index(text, from);
            loop {
                let found = regex.find_at(text, from_byte)?;
                if found.start() < found.end() {
                    return Some(span_from_bytes(text, found.start(), found.end()));
                }
                // 幅ゼロのマッチは1文字先から探し直す
                let step = text[found.end()..].chars().next()?;
                from_byte = found.end() + step.len_utf8();
            }
        }
        None => literal_next(text, query.source(), query.ignore_case(), from),
    }
}

/// `limit` 以前で終わる、幅1文字以上の最後のマッチ
fn prev_match(query: &Query, text: &str, limit: usize) -> Option<MatchSpan> {
    if query.is_empty() {
        return None;
    }

    match query.regex() {
        Some(regex) => {
            let mut last = None;
            for found in regex.find_iter(text) {
                if found.start() == found.end() {
                    continue;
                }
                let span = span_from_bytes(text, found.start(), found.end());
                if span.end > limit {
                    break;
                }
                last = Some(span);
            }
            last
        }
        None => literal_prev(text, query.source(), query.ignore_case(), limit),
    }
}

fn literal_next(text: &str, needle: &str, ignore_case: bool, from: usize) -> Option<MatchSpan> {
    let chars: Vec<char> = text.chars().collect();
    let needle_chars: Vec<char> = needle.chars().collect();

    if needle_chars.is_empty() || chars.len() < needle_chars.len() {
        return None;
    }

    let last_start = chars.len() - needle_chars.len();
    if from > last_start {
        return None;
    }

    'outer: for start in from..=last_start {
        for (offset, pat) in needle_chars.iter().enumerate() {
            if !chars_equal(chars[start + offset], *pat, ignore_case) {
                continue 'outer;
            }
        }
        return Some(MatchSpan::new(start, start + needle_chars.len()));
    }

    None
}

fn literal_prev(text: &str, needle: &str, ignore_case: bool, limit: usize) -> Option<MatchSpan> {
    let chars: Vec<char> = text.chars().collect();
    let needle_chars: Vec<char> = needle.chars().collect();

    if needle_chars.is_empty() || chars.len() < needle_chars.len() {
        return None;
    }
    if limit < needle_chars.len() {
        return None;
    }

    let last_start = chars.len() - needle_chars.len();
    let upper = last_start.min(limit - needle_chars.len());

    'outer: for start in (0..=upper).rev() {
        for (offset, pat) in needle_chars.iter().enumerate() {
            if !chars_equal(chars[start + offset], *pat, ignore_case) {
                continue 'outer;
            }
        }
        return Some(MatchSpan::new(start, start + needle_chars.len()));
    }

    None
}

// Unicodeケースフォールディング（簡易）
fn chars_equal(a: char, b: char, ignore_case: bool) -> bool {
    if !ignore_case {
        return a == b;
    }
    a.to_lowercase().eq(b.to_lowercase())
}

fn span_from_bytes(text: &str, start_byte: usize, end_byte: usize) -> MatchSpan {
    let start = byte_to_char_index(text, start_byte);
    let end = start + text[start_byte..end_byte].chars().count();
    MatchSpan::new(start, end)
}

/// 文字インデックスをバイトインデックスへ変換
pub(crate) fn char_to_byte_index(text: &str, index: usize) -> usize {
    text.char_indices()
        .nth(index)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(text.len())
}

/// バイトインデックスを文字インデックスへ変換
pub(crate) fn byte_to_char_index(text: &str, byte_idx: usize) -> usize {
    text[..byte_idx].chars().count()
}

/// 文字インデックス範囲でスライスを取り出す
pub(crate) fn slice_by_chars(text: &str, span: MatchSpan) -> &str {
    let start = char_to_byte_index(text, span.start);
    let end = char_to_byte_index(text, span.end);
    &text[start..end]
}

/// 文字インデックス範囲を置き換える
pub(crate) fn replace_span_in_string(text: &mut String, span: MatchSpan, replacement: &str) {
    let start = char_to_byte_index(text, span.start);
    let end = char_to_byte_index(text, span.end);
    text.replace_range(start..end, replacement);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SearchOptions;

    fn literal(source: &str, ignore_case: bool) -> Query {
        Query::parse(
            source,
            SearchOptions {
                ignore_case,
                ..SearchOptions::default()
            },
        )
        .unwrap()
    }

    fn pattern(source: &str) -> Query {
        Query::parse(
            source,
            SearchOptions {
                is_pattern: true,
                ..SearchOptions::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn finds_next_literal_from_seed() {
        let query = literal("hello", false);
        let mut cursor = MatchCursor::new("hello world hello", &query, 1);
        assert_eq!(cursor.find_next(), Some(MatchSpan::new(12, 17)));
        assert_eq!(cursor.find_next(), None);
    }

    #[test]
    fn finds_next_at_seed_inclusive() {
        let query = literal("hello", false);
        let mut cursor = MatchCursor::new("hello world", &query, 0);
        assert_eq!(cursor.find_next(), Some(MatchSpan::new(0, 5)));
    }

    #[test]
    fn finds_prev_before_limit() {
        let query = literal("hello", false);
        let mut cursor = MatchCursor::new("hello world hello", &query, 12);
        assert_eq!(cursor.find_prev(), Some(MatchSpan::new(0, 5)));
        assert_eq!(cursor.find_prev(), None);
    }

    #[test]
    fn prev_includes_match_ending_at_limit() {
        let query = literal("hello", false);
        let mut cursor = MatchCursor::new("hello world", &query, 5);
        assert_eq!(cursor.find_prev(), Some(MatchSpan::new(0, 5)));
    }

    #[test]
    fn successive_next_calls_walk_all_matches() {
        let query = literal("ab", false);
        let mut cursor = MatchCursor::new("ababab", &query, 0);
        assert_eq!(cursor.find_next(), Some(MatchSpan::new(0, 2)));
        assert_eq!(cursor.find_next(), Some(MatchSpan::new(2, 4)));
        assert_eq!(cursor.find_next(), Some(MatchSpan::new(4, 6)));
        assert_eq!(cursor.find_next(), None);
    }

    #[test]
    fn case_insensitive_literal() {
        let query = literal("foo", true);
        let mut cursor = MatchCursor::new("FOO bar Foo", &query, 0);
        assert_eq!(cursor.find_next(), Some(MatchSpan::new(0, 3)));
        assert_eq!(cursor.find_next(), Some(MatchSpan::new(8, 11)));
    }

    #[test]
    fn case_sensitive_literal_skips_other_case() {
        let query = literal("Foo", false);
        let mut cursor = MatchCursor::new("foo Foo", &query, 0);
        assert_eq!(cursor.find_next(), Some(MatchSpan::new(4, 7)));
    }

    #[test]
    fn pattern_match_spans_are_char_indexed() {
        let query = pattern(r"\d+");
        let mut cursor = MatchCursor::new("値は42と100", &query, 0);
        assert_eq!(cursor.find_next(), Some(MatchSpan::new(2, 4)));
        assert_eq!(cursor.find_next(), Some(MatchSpan::new(5, 8)));
    }

    #[test]
    fn pattern_prev_finds_last_before_limit() {
        let query = pattern(r"\d+");
        let mut cursor = MatchCursor::new("1 22 333", &query, 4);
        assert_eq!(cursor.find_prev(), Some(MatchSpan::new(2, 4)));
    }

    #[test]
    fn zero_width_matches_are_stepped_over() {
        let query = pattern("x*");
        let mut cursor = MatchCursor::new("axxb", &query, 0);
        assert_eq!(cursor.find_next(), Some(MatchSpan::new(1, 3)));
        assert_eq!(cursor.find_next(), None);

        let mut no_runs = MatchCursor::new("ab", &query, 0);
        assert_eq!(no_runs.find_next(), None);
        assert_eq!(MatchCursor::new("axxb", &query, 4).find_prev(), Some(MatchSpan::new(1, 3)));
    }

    #[test]
    fn empty_query_never_matches() {
        let query = literal("", false);
        let mut cursor = MatchCursor::new("abc", &query, 0);
        assert_eq!(cursor.find_next(), None);
        assert_eq!(cursor.find_prev(), None);
    }

    #[test]
    fn seed_past_end_finds_nothing() {
        let query = literal("a", false);
        let mut cursor = MatchCursor::new("abc", &query, 10);
        assert_eq!(cursor.find_next(), None);
    }

    #[test]
    fn multiline_anchors_match_line_starts() {
        let query = pattern("^b.*");
        let mut cursor = MatchCursor::new("abc\nbcd", &query, 0);
        assert_eq!(cursor.find_next(), Some(MatchSpan::new(4, 7)));
    }

    #[test]
    fn char_byte_conversion_with_multibyte() {
        let text = "café latte";
        assert_eq!(char_to_byte_index(text, 4), 5);
        assert_eq!(byte_to_char_index(text, 5), 4);
        assert_eq!(slice_by_chars(text, MatchSpan::new(0, 4)), "café");
    }

    #[test]
    fn replace_span_handles_multibyte() {
        let mut text = String::from("café latte");
        replace_span_in_string(&mut text, MatchSpan::new(0, 4), "tea");
        assert_eq!(text, "tea latte");
    }
}
