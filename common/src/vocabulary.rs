//! 語彙テーブルモジュール
//!
//! 略語展開表と索引・補遺の判定語を保持する。
//! 構築後は不変で、Normalizer / SpanExtractor に渡して使う。

use crate::error::{Error, Result};
use crate::span::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 語彙定義
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// 略語 → 正規化後のキーワード（volume/number/part/series/copy）
    #[serde(default)]
    pub abbreviations: BTreeMap<String, String>,
    /// 索引を示す語
    #[serde(default)]
    pub index_terms: Vec<String>,
    /// 補遺を示す語
    #[serde(default)]
    pub supplement_terms: Vec<String>,
    /// 略語展開の対象外とする表記（`n.s.` = new series など）
    #[serde(default)]
    pub protected_terms: Vec<String>,
}

impl Vocabulary {
    /// 組み込みプリセットを取得
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "standard" | "default" => Some(Self::standard_preset()),
            "english" | "en" => Some(Self::english_preset()),
            "german" | "de" => Some(Self::german_preset()),
            _ => None,
        }
    }

    /// 標準語彙（英語 + ドイツ語の巻号表記）
    pub fn standard() -> Self {
        Self::standard_preset()
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let vocabulary: Self = serde_json::from_str(json)?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    fn standard_preset() -> Self {
        let mut vocabulary = Self::english_preset();
        vocabulary.merge(&Self::german_preset());
        vocabulary
    }

    /// 英語の略語
    fn english_preset() -> Self {
        let mut vocabulary = Self::default();

        for abbr in ["v", "vol", "vols"] {
            vocabulary.abbreviations.insert(abbr.into(), "volume".into());
        }
        for abbr in ["no", "nos", "n"] {
            vocabulary.abbreviations.insert(abbr.into(), "number".into());
        }
        for abbr in ["pt", "pts", "p"] {
            vocabulary.abbreviations.insert(abbr.into(), "part".into());
        }
        for abbr in ["ser", "s"] {
            vocabulary.abbreviations.insert(abbr.into(), "series".into());
        }
        for abbr in ["c", "cop", "cp"] {
            vocabulary.abbreviations.insert(abbr.into(), "copy".into());
        }

        vocabulary.index_terms = vec!["index".into(), "indexes".into(), "indices".into()];
        vocabulary.supplement_terms = vec![
            "suppl".into(),
            "supp".into(),
            "supplement".into(),
            "supplements".into(),
        ];
        vocabulary.protected_terms = vec!["n.s.".into(), "nser".into()];

        vocabulary
    }

    /// ドイツ語の巻号表記（Jahrgang, Band, Heft）
    fn german_preset() -> Self {
        let mut vocabulary = Self::default();

        vocabulary.abbreviations.insert("jahrg".into(), "volume".into());
        vocabulary.abbreviations.insert("jg".into(), "volume".into());
        vocabulary.abbreviations.insert("bd".into(), "part".into());
        vocabulary.abbreviations.insert("bde".into(), "part".into());
        vocabulary.abbreviations.insert("heft".into(), "number".into());

        vocabulary.index_terms = vec!["register".into()];
        vocabulary.supplement_terms = vec!["beilage".into()];

        vocabulary
    }

    /// 語彙をマージ（後から追加した定義が優先）
    pub fn merge(&mut self, other: &Vocabulary) {
        self.abbreviations.extend(other.abbreviations.clone());
        for term in &other.index_terms {
            if !self.index_terms.contains(term) {
                self.index_terms.push(term.clone());
            }
        }
        for term in &other.supplement_terms {
            if !self.supplement_terms.contains(term) {
                self.supplement_terms.push(term.clone());
            }
        }
        for term in &other.protected_terms {
            if !self.protected_terms.contains(term) {
                self.protected_terms.push(term.clone());
            }
        }
    }

    /// 略語表と判定語の整合性を検証
    pub fn validate(&self) -> Result<()> {
        for (abbr, target) in &self.abbreviations {
            if abbr.is_empty() || !abbr.chars().all(|c| c.is_alphabetic() && c.is_lowercase()) {
                return Err(Error::Config(format!(
                    "abbreviation '{abbr}' must be a lowercase word"
                )));
            }
            if Category::from_keyword(target).is_none() {
                return Err(Error::Config(format!(
                    "abbreviation '{abbr}' expands to '{target}', expected one of \
                     volume, number, part, series, copy"
                )));
            }
            if Category::from_keyword(abbr).is_some() {
                return Err(Error::Config(format!(
                    "'{abbr}' is already a full keyword and cannot be an abbreviation"
                )));
            }
        }

        for term in self
            .index_terms
            .iter()
            .chain(&self.supplement_terms)
            .chain(&self.protected_terms)
        {
            if term.trim().is_empty() {
                return Err(Error::Config("empty index/supplement/protected term".into()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_preset() {
        let vocabulary = Vocabulary::from_preset("standard").unwrap();
        assert_eq!(vocabulary.abbreviations.get("v"), Some(&"volume".to_string()));
        assert_eq!(vocabulary.abbreviations.get("jahrg"), Some(&"volume".to_string()));
        assert_eq!(vocabulary.abbreviations.get("bd"), Some(&"part".to_string()));
        assert!(vocabulary.index_terms.contains(&"index".to_string()));
        assert!(vocabulary.index_terms.contains(&"register".to_string()));
        assert!(vocabulary.validate().is_ok());
    }

    #[test]
    fn test_new_series_protected() {
        let vocabulary = Vocabulary::standard();
        assert!(vocabulary.protected_terms.contains(&"n.s.".to_string()));
        assert!(vocabulary.protected_terms.contains(&"nser".to_string()));
    }

    #[test]
    fn test_validate_rejects_blank_protected_term() {
        let result = Vocabulary::from_json(r#"{"protected_terms": [" "]}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_preset() {
        assert!(Vocabulary::from_preset("klingon").is_none());
    }

    #[test]
    fn test_merge_overrides() {
        let mut vocabulary = Vocabulary::standard();
        let custom = Vocabulary::from_json(r#"{"abbreviations": {"p": "number", "hft": "number"}}"#)
            .unwrap();
        vocabulary.merge(&custom);

        assert_eq!(vocabulary.abbreviations.get("p"), Some(&"number".to_string()));
        assert_eq!(vocabulary.abbreviations.get("hft"), Some(&"number".to_string()));
        assert_eq!(vocabulary.abbreviations.get("v"), Some(&"volume".to_string()));
    }

    #[test]
    fn test_merge_does_not_duplicate_terms() {
        let mut vocabulary = Vocabulary::standard();
        let count = vocabulary.index_terms.len();
        vocabulary.merge(&Vocabulary::standard());
        assert_eq!(vocabulary.index_terms.len(), count);
    }

    #[test]
    fn test_validate_rejects_unknown_target() {
        let result = Vocabulary::from_json(r#"{"abbreviations": {"bk": "book"}}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_keyword_as_abbreviation() {
        let result = Vocabulary::from_json(r#"{"abbreviations": {"volume": "part"}}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
