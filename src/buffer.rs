//! バッファコラボレータとの接点
//!
//! 検索エンジンが依存する最小限のバッファ側プリミティブを trait として
//! 定義する。テキストの格納・描画・アンドゥ実装はエディタ側の責務。

use crate::cursor::{char_to_byte_index, MatchSpan};

/// ハイライトマークのハンドル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkId(u64);

impl MarkId {
    /// ハンドルを作成（コラボレータ実装用）
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// 内部値を取得
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// 検索エンジンが必要とするバッファ操作
///
/// 1回の論理操作に伴う読み書きは `begin_operation`/`end_operation` で
/// 括られる。一括置換はさらに `begin_change_group`/`end_change_group`
/// で括られ、1回のアンドゥ単位になる。どちらもネスト可能で、
/// 既定実装は何もしない。
pub trait TextBuffer {
    /// バッファの行数
    fn line_count(&self) -> usize;

    /// 現在のテキストのスナップショット
    fn text(&self) -> String;

    /// 現在のカーソル位置（文字インデックス）
    fn cursor_position(&self) -> usize;

    /// 範囲を選択状態にする
    fn set_selection(&mut self, span: MatchSpan);

    /// 範囲のテキストを置き換える
    fn replace_range(&mut self, span: MatchSpan, replacement: &str);

    /// 範囲にハイライトマークを付ける
    fn add_mark(&mut self, span: MatchSpan) -> MarkId;

    /// ハイライトマークを取り除く
    fn clear_mark(&mut self, id: MarkId);

    /// 再描画を1回にまとめるバッチの開始
    fn begin_operation(&mut self) {}

    /// バッチの終了
    fn end_operation(&mut self) {}

    /// アンドゥ単位をまとめるチェンジグループの開始
    fn begin_change_group(&mut self) {}

    /// チェンジグループの終了
    fn end_change_group(&mut self) {}
}

/// `String` ベースの参照コラボレータ
///
/// テストや簡易な組み込みのためのバッファ実装。選択・マーク・
/// バッチ呼び出しを記録するだけで、描画やアンドゥスタックは持たない。
#[derive(Debug, Clone, Default)]
pub struct StringBuffer {
    text: String,
    cursor: usize,
    selection: Option<MatchSpan>,
    marks: Vec<(MarkId, MatchSpan)>,
    next_mark: u64,
    operation_depth: usize,
    group_depth: usize,
    finished_groups: usize,
}

impl StringBuffer {
    /// 空のバッファを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 初期テキストからバッファを作成
    pub fn from_str(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    /// 現在のテキスト
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// カーソルを移動（文字インデックス）
    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.text.chars().count());
    }

    /// 現在の選択範囲
    pub fn selection(&self) -> Option<MatchSpan> {
        self.selection
    }

    /// 付与中のハイライトマーク範囲（付与順）
    pub fn mark_spans(&self) -> Vec<MatchSpan> {
        self.marks.iter().map(|(_, span)| *span).collect()
    }

    /// 付与中のハイライトマーク数
    pub fn mark_count(&self) -> usize {
        self.marks.len()
    }

    /// 完了したチェンジグループの数
    pub fn finished_change_groups(&self) -> usize {
        self.finished_groups
    }
}

impl TextBuffer for StringBuffer {
    fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn cursor_position(&self) -> usize {
        self.cursor
    }

    fn set_selection(&mut self, span: MatchSpan) {
        self.selection = Some(span);
        self.cursor = span.end;
    }

    fn replace_range(&mut self, span: MatchSpan, replacement: &str) {
        let start = char_to_byte_index(&self.text, span.start);
        let end = char_to_byte_index(&self.text, span.end);
        self.text.replace_range(start..end, replacement);
        self.cursor = span.start + replacement.chars().count();
    }

    fn add_mark(&mut self, span: MatchSpan) -> MarkId {
        let id = MarkId::new(self.next_mark);
        self.next_mark += 1;
        self.marks.push((id, span));
        id
    }

    fn clear_mark(&mut self, id: MarkId) {
        self.marks.retain(|(mark, _)| *mark != id);
    }

    fn begin_operation(&mut self) {
        self.operation_depth += 1;
    }

    fn end_operation(&mut self) {
        self.operation_depth = self.operation_depth.saturating_sub(1);
    }

    fn begin_change_group(&mut self) {
        self.group_depth += 1;
    }

    fn end_change_group(&mut self) {
        self.group_depth = self.group_depth.saturating_sub(1);
        if self.group_depth == 0 {
            self.finished_groups += 1;
        }
    }
}
