//! クエリ正規化
//!
//! 生のクエリ文字列とオプションから、マッチングに使える正規化済み
//! クエリオブジェクトを構築する

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// 検索オプション
///
/// ホストエディタから渡される3つのフラグ。未知のキーは
/// デシリアライズ時に拒否される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchOptions {
    /// 大文字小文字を区別しない（既定: false）
    pub ignore_case: bool,
    /// クエリをリテラルではなくパターンとして扱う（既定: false）
    pub is_pattern: bool,
    /// 全マッチの事前ハイライトを行う（既定: true）
    pub highlight: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            ignore_case: false,
            is_pattern: false,
            highlight: true,
        }
    }
}

#[derive(Debug, Clone)]
enum QueryKind {
    Literal,
    Pattern(Regex),
}

/// 正規化済みクエリ
///
/// リテラル文字列、またはケース感度を織り込んでコンパイル済みの
/// パターン。元のクエリ文字列が空なら「検索なし」を意味する。
#[derive(Debug, Clone)]
pub struct Query {
    source: String,
    ignore_case: bool,
    kind: QueryKind,
}

impl Query {
    /// 生のクエリ文字列を正規化する
    ///
    /// `is_pattern` が真ならクエリをパターンとしてコンパイルし、
    /// コンパイル失敗は [`crate::SearchError::InvalidQuery`] として
    /// 呼び出し側へ伝播する。
    pub fn parse(raw: &str, options: SearchOptions) -> Result<Self> {
        let kind = if options.is_pattern {
            let regex = RegexBuilder::new(raw)
                .case_insensitive(options.ignore_case)
                .multi_line(true)
                .dot_matches_new_line(false)
                .build()?;
            QueryKind::Pattern(regex)
        } else {
            QueryKind::Literal
        };

        Ok(Self {
            source: raw.to_string(),
            ignore_case: options.ignore_case,
            kind,
        })
    }

    /// 元のクエリ文字列
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 大文字小文字を区別しないか
    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// パターンクエリか判定
    pub fn is_pattern(&self) -> bool {
        matches!(self.kind, QueryKind::Pattern(_))
    }

    /// 空クエリ（検索なし）か判定
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// コンパイル済みパターンを取得（リテラルなら None）
    pub fn regex(&self) -> Option<&Regex> {
        match &self.kind {
            QueryKind::Pattern(regex) => Some(regex),
            QueryKind::Literal => None,
        }
    }
}

// 同一検索の判定は (元文字列, ケース感度, パターンか) の組で行う
impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.ignore_case == other.ignore_case
            && self.is_pattern() == other.is_pattern()
    }
}

impl Eq for Query {}
