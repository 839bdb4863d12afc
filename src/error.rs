//! エラーハンドリング
//!
//! 検索・置換エンジン全体で使用するエラー型を定義

use thiserror::Error;

/// 検索・置換操作のエラー型
///
/// マッチが存在しないことはエラーではなく、選択が変化しないという
/// 通常の結果として扱う。
#[derive(Debug, Error, Clone)]
pub enum SearchError {
    /// パターンとして解釈できないクエリ
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] regex::Error),
}

/// クレート標準の Result 型
pub type Result<T> = std::result::Result<T, SearchError>;
