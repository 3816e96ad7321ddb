//! 巻号表示の正規化
//!
//! - 小文字化
//! - 略語展開（`v.` / `vol.` → `volume` など、語頭かつ数字が続く場合のみ）
//!   - `n.s.`（new series）のような保護語の中は展開しない
//!   - 複本の略語に4桁の数字が直結する `c1990` は年として残す
//! - 数字直後の句読点除去（`1891.` → `1891`）
//! - 空白の統一
//!
//! 何度適用しても結果は変わらない（冪等）。

use crate::error::{Error, Result};
use crate::span::Category;
use crate::vocabulary::Vocabulary;
use regex::Regex;
use std::collections::BTreeMap;
use std::ops::Range;

/// 正規化器
#[derive(Debug, Clone)]
pub struct Normalizer {
    abbreviations: BTreeMap<String, String>,
    abbreviation_re: Option<Regex>,
    protected_re: Option<Regex>,
}

impl Normalizer {
    /// 語彙テーブルから正規化器を構築
    pub fn new(vocabulary: &Vocabulary) -> Result<Self> {
        let protected_re = protected_regex(&vocabulary.protected_terms)?;

        if vocabulary.abbreviations.is_empty() {
            return Ok(Self {
                abbreviations: BTreeMap::new(),
                abbreviation_re: None,
                protected_re,
            });
        }

        // 長い略語を先に試す（vols → vol → v）
        let mut keys: Vec<&String> = vocabulary.abbreviations.keys().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let alternation = keys
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");

        let pattern =
            format!(r"(^|[^\p{{Alphabetic}}\p{{N}}])({alternation})(?:\.\s*|\s*)([0-9])");
        let abbreviation_re = Regex::new(&pattern)
            .map_err(|e| Error::Config(format!("abbreviation table: {e}")))?;

        Ok(Self {
            abbreviations: vocabulary.abbreviations.clone(),
            abbreviation_re: Some(abbreviation_re),
            protected_re,
        })
    }

    /// ラベルを正規化する
    pub fn normalize(&self, label: &str) -> String {
        lazy_static::lazy_static! {
            static ref TRAILING_PUNCT_RE: Regex = Regex::new(r"([0-9])[.,;:]+(\s|$)").unwrap();
        }

        let mut result = label.to_lowercase();

        if let Some(re) = &self.abbreviation_re {
            let protected: Vec<Range<usize>> = self
                .protected_re
                .iter()
                .flat_map(|p| p.find_iter(&result).map(|m| m.range()))
                .collect();

            let expanded = re.replace_all(&result, |caps: &regex::Captures| {
                let (Some(key), Some(digit)) = (caps.get(2), caps.get(3)) else {
                    return caps[0].to_string();
                };
                if protected.iter().any(|r| r.start < key.end() && key.start() < r.end) {
                    return caps[0].to_string();
                }

                let full = self
                    .abbreviations
                    .get(key.as_str())
                    .map(String::as_str)
                    .unwrap_or(key.as_str());
                // `c1990` は複本ではなく年（circa / copyright）
                if Category::Copy.keyword() == Some(full)
                    && key.end() == digit.start()
                    && is_year_digits(&result[digit.start()..])
                {
                    return caps[0].to_string();
                }

                format!("{}{} {}", &caps[1], full, digit.as_str())
            });
            result = expanded.into_owned();
        }

        result = TRAILING_PUNCT_RE.replace_all(&result, "$1$2").into_owned();

        collapse_whitespace(&result)
    }
}

/// 略語展開から外す語（`n.s.` など）の正規表現
fn protected_regex(terms: &[String]) -> Result<Option<Regex>> {
    if terms.is_empty() {
        return Ok(None);
    }
    let alternation = terms
        .iter()
        .map(|t| regex::escape(&t.trim().to_lowercase()))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?:^|\b)(?:{alternation})"))
        .map(Some)
        .map_err(|e| Error::Config(format!("protected terms: {e}")))
}

/// 先頭がちょうど4桁の数字か
fn is_year_digits(text: &str) -> bool {
    text.bytes().take_while(u8::is_ascii_digit).count() == 4
}

/// 連続空白を1つにまとめ、前後をトリム
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
