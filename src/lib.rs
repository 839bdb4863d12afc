//! kensaku - テキストバッファ向けの検索・置換エンジン
//!
//! エディタ本体（コラボレータ）が公開するバッファに対して、クエリの
//! 正規化・検索カーソルの継続・マッチハイライトの寿命管理・一括置換を
//! 提供する。テキストの格納・描画・アンドゥスタックはコラボレータの
//! 責務であり、このクレートは [`TextBuffer`] trait 越しに操作する。

// コアモジュール
pub mod error;

// クエリ層
pub mod query;

// 検索層
pub mod controller;
pub mod cursor;
pub mod state;

// 置換層
pub mod replace;

// コラボレータ接点
pub mod buffer;

// 公開API
pub use buffer::{MarkId, StringBuffer, TextBuffer};
pub use controller::SearchController;
pub use cursor::{MatchCursor, MatchSpan};
pub use error::{Result, SearchError};
pub use query::{Query, SearchOptions};
pub use state::SearchState;
