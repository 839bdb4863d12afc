//! 検索・置換の状態機械
//!
//! バッファごとに1つの [`SearchController`] を保持し、検索の継続・
//! ハイライトの寿命・一括置換を調停する。各操作はバッファの
//! オペレーションバッチ内で完結する。

use crate::buffer::TextBuffer;
use crate::cursor::{replace_span_in_string, slice_by_chars, MatchCursor, MatchSpan};
use crate::error::Result;
use crate::query::{Query, SearchOptions};
use crate::replace::expand_captures;
use crate::state::SearchState;

/// 全マッチハイライトを適用する行数の上限（大きな文書では高コスト）
const HIGHLIGHT_LINE_LIMIT: usize = 2000;

/// 検索・置換コントローラ
///
/// 1つのバッファにつき1インスタンス。すべての操作を同じ
/// インスタンス経由で呼び出すことで、検索の継続が機能する。
#[derive(Debug, Default)]
pub struct SearchController {
    state: SearchState,
}

impl SearchController {
    /// コントローラを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 内部状態への参照（観測用）
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// 検索がアクティブか判定
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// 次のマッチへ進む（文書端で折り返す）
    ///
    /// 前回と同じクエリ・オプションなら前回位置からの継続になり、
    /// 異なれば新規検索として状態を作り直す。マッチが存在しない
    /// 場合は選択を変えずに戻る。
    pub fn find_next<B: TextBuffer>(
        &mut self,
        buffer: &mut B,
        query: &str,
        options: SearchOptions,
    ) -> Result<()> {
        self.find(buffer, query, options, false)
    }

    /// 前のマッチへ戻る（文書端で折り返す）
    pub fn find_prev<B: TextBuffer>(
        &mut self,
        buffer: &mut B,
        query: &str,
        options: SearchOptions,
    ) -> Result<()> {
        self.find(buffer, query, options, true)
    }

    /// アクティブな検索を破棄し、ハイライトマークを解放する
    ///
    /// 検索がなければ何もしない。何度呼んでも安全。
    pub fn clear_search<B: TextBuffer>(&mut self, buffer: &mut B) {
        if !self.state.is_active() {
            return;
        }

        buffer.begin_operation();
        self.state.query = None;
        self.state.cursor = None;
        for id in self.state.marks.drain(..) {
            buffer.clear_mark(id);
        }
        buffer.end_operation();
    }

    /// 直近のマッチだけを置き換える
    ///
    /// 事前の `find_next`/`find_prev` が成功していなければ何もしない。
    /// アクティブな検索がパターンなら置換テキストの `$N` を展開する。
    /// 展開するかどうかはアクティブな検索のオプションで決まり、
    /// 引数の `_query`/`_options` は参照しない。
    pub fn replace<B: TextBuffer>(
        &mut self,
        buffer: &mut B,
        _query: &str,
        replacement: &str,
        _options: SearchOptions,
    ) {
        let (Some(query), Some(span)) = (self.state.query.clone(), self.state.cursor) else {
            return;
        };

        buffer.begin_operation();
        let expanded = if self.state.options.is_pattern {
            let text = buffer.text();
            let matched = slice_by_chars(&text, span);
            query
                .regex()
                .and_then(|regex| regex.captures(matched))
                .map(|caps| expand_captures(&caps, replacement))
        } else {
            Some(replacement.to_string())
        };

        match expanded {
            Some(new_text) => {
                buffer.replace_range(span, &new_text);
                let new_span = MatchSpan::new(span.start, span.start + new_text.chars().count());
                self.state.cursor = Some(new_span);
                self.state.pos_from = new_span.start;
                self.state.pos_to = new_span.end;
                buffer.set_selection(new_span);
            }
            // パターンが自身のマッチ文字列に再マッチしない場合は置換せず
            // 選択だけ維持する
            None => buffer.set_selection(span),
        }
        buffer.end_operation();
    }

    /// 直近のマッチを置き換えてから、次のマッチへ進む
    pub fn find_replace<B: TextBuffer>(
        &mut self,
        buffer: &mut B,
        query: &str,
        replacement: &str,
        options: SearchOptions,
    ) -> Result<()> {
        self.replace(buffer, query, replacement, options);
        self.find(buffer, query, options, false)
    }

    /// 文書中のすべてのマッチを置き換え、置換件数を返す
    ///
    /// バッファへの変更は1つのチェンジグループにまとまり、1回の
    /// アンドゥで戻せる。終了後、アクティブな検索は破棄される。
    pub fn replace_all<B: TextBuffer>(
        &mut self,
        buffer: &mut B,
        query: &str,
        replacement: &str,
        options: SearchOptions,
    ) -> Result<usize> {
        let query = Query::parse(query, options)?;
        if query.is_empty() {
            return Ok(0);
        }

        let mut count = 0usize;
        buffer.begin_change_group();
        buffer.begin_operation();

        let mut working = buffer.text();
        let mut pos = 0usize;
        loop {
            let found = MatchCursor::new(&working, &query, pos).find_next();
            let Some(span) = found else {
                break;
            };

            let expanded = if options.is_pattern {
                let matched = slice_by_chars(&working, span);
                match query.regex().and_then(|regex| regex.captures(matched)) {
                    Some(caps) => expand_captures(&caps, replacement),
                    None => replacement.to_string(),
                }
            } else {
                replacement.to_string()
            };

            buffer.replace_range(span, &expanded);
            replace_span_in_string(&mut working, span, &expanded);
            count += 1;

            // 置換による長さ変化を踏まえ、置換テキストの直後から探索を続ける
            pos = span.start + expanded.chars().count();
        }

        buffer.end_operation();
        buffer.end_change_group();
        self.clear_search(buffer);

        if count > 0 {
            log::debug!("replace_all: {} replacements", count);
        }
        Ok(count)
    }

    fn find<B: TextBuffer>(
        &mut self,
        buffer: &mut B,
        raw: &str,
        options: SearchOptions,
        reverse: bool,
    ) -> Result<()> {
        let query = Query::parse(raw, options)?;

        // 同一クエリ・同一フラグなら継続：前回位置から前進するだけ
        if self.state.is_same_search(&query, options) {
            buffer.begin_operation();
            self.advance(buffer, reverse);
            buffer.end_operation();
            return Ok(());
        }

        self.clear_search(buffer);
        if query.is_empty() {
            return Ok(());
        }

        buffer.begin_operation();
        self.state.options = options;
        if options.highlight {
            if buffer.line_count() < HIGHLIGHT_LINE_LIMIT {
                self.highlight_all(buffer, &query);
            } else {
                log::debug!("highlight skipped: {} lines", buffer.line_count());
            }
        }
        self.state.query = Some(query);

        let origin = buffer.cursor_position();
        self.state.pos_from = origin;
        self.state.pos_to = origin;
        self.advance(buffer, reverse);
        buffer.end_operation();
        Ok(())
    }

    /// 前回マッチ位置を起点に次/前のマッチへ進み、見つかれば選択する
    fn advance<B: TextBuffer>(&mut self, buffer: &mut B, reverse: bool) {
        let Some(query) = self.state.query.clone() else {
            return;
        };

        let text = buffer.text();
        let seed = if reverse {
            self.state.pos_from
        } else {
            self.state.pos_to
        };

        let mut found = MatchCursor::new(&text, &query, seed).find(reverse);
        if found.is_none() {
            // 文書端から折り返して1回だけ再試行
            let boundary = if reverse { text.chars().count() } else { 0 };
            found = MatchCursor::new(&text, &query, boundary).find(reverse);
        }

        let Some(span) = found else {
            return;
        };
        self.state.pos_from = span.start;
        self.state.pos_to = span.end;
        self.state.cursor = Some(span);
        buffer.set_selection(span);
    }

    /// 文書全体を先頭から走査し、全マッチへ文書順にマークを付ける
    fn highlight_all<B: TextBuffer>(&mut self, buffer: &mut B, query: &Query) {
        let text = buffer.text();
        let mut cursor = MatchCursor::new(&text, query, 0);
        while let Some(span) = cursor.find_next() {
            let id = buffer.add_mark(span);
            self.state.marks.push(id);
        }
    }
}
