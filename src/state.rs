//! 検索状態の管理

use crate::buffer::MarkId;
use crate::cursor::MatchSpan;
use crate::query::{Query, SearchOptions};

/// バッファ1つ分の検索・置換状態
///
/// バッファを包む側が1インスタンスだけ保持し、各操作に渡す。
/// `clear` 相当の操作ではフィールドを空に戻すだけで破棄はしない。
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// 正規化済みクエリ（None = 検索なし）
    pub query: Option<Query>,
    /// 直近マッチの開始位置（後方検索の起点）
    pub pos_from: usize,
    /// 直近マッチの終了位置（前方検索の起点）
    pub pos_to: usize,
    /// 直近に成功したマッチ範囲（置換対象）
    pub cursor: Option<MatchSpan>,
    /// ハイライトマークのハンドル（文書順）
    pub marks: Vec<MarkId>,
    /// 現在のクエリに適用中のオプション
    pub options: SearchOptions,
}

impl SearchState {
    /// 新しい状態を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 検索がアクティブか判定
    pub fn is_active(&self) -> bool {
        self.query.is_some()
    }

    /// 同一検索の繰り返し（継続）か判定
    pub fn is_same_search(&self, query: &Query, options: SearchOptions) -> bool {
        self.query.as_ref() == Some(query)
            && self.options.ignore_case == options.ignore_case
            && self.options.is_pattern == options.is_pattern
    }
}
