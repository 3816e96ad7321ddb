//! 巻号ラベルの抽出結果
//!
//! `LabelRecord` は SpanExtractor が1回だけ生成する不変の値。
//! `LabelSet` は照合の前提条件である重複除去を済ませたレコード列。

use crate::extractor::SpanExtractor;
use crate::span::{Category, DateSpan, Span};
use serde::Serialize;
use std::collections::HashSet;

/// 1つの生ラベルから抽出した構造
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LabelRecord {
    /// 入力そのまま
    pub raw: String,
    pub series: Option<Span>,
    pub volume: Option<Span>,
    pub number: Option<Span>,
    pub part: Option<Span>,
    pub date: Option<DateSpan>,
    pub copy: Option<Span>,
    pub is_index: bool,
    pub is_supplement: bool,
    /// どのカテゴリにも取られなかった残りのテキスト
    pub remainder: String,
}

/// カテゴリ共通の値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanValue {
    Numeric(Span),
    Date(DateSpan),
}

impl SpanValue {
    /// 同じ種類同士の重なり率。種類が違えば0
    pub fn coverage(&self, other: &SpanValue) -> f64 {
        match (self, other) {
            (SpanValue::Numeric(a), SpanValue::Numeric(b)) => a.coverage(b),
            (SpanValue::Date(a), SpanValue::Date(b)) => a.coverage(b),
            _ => 0.0,
        }
    }
}

impl std::fmt::Display for SpanValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanValue::Numeric(span) => write!(f, "{span}"),
            SpanValue::Date(span) => write!(f, "{span}"),
        }
    }
}

impl LabelRecord {
    /// カテゴリを指定して値を取得
    pub fn span(&self, category: Category) -> Option<SpanValue> {
        match category {
            Category::Series => self.series.map(SpanValue::Numeric),
            Category::Volume => self.volume.map(SpanValue::Numeric),
            Category::Number => self.number.map(SpanValue::Numeric),
            Category::Part => self.part.map(SpanValue::Numeric),
            Category::Copy => self.copy.map(SpanValue::Numeric),
            Category::Date => self.date.map(SpanValue::Date),
        }
    }

    /// 値のあるカテゴリ（固定順）
    pub fn populated(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.span(*c).is_some())
            .collect()
    }

    pub fn has_spans(&self) -> bool {
        Category::ALL.iter().any(|c| self.span(*c).is_some())
    }

    /// スパンもフラグも残りテキストもない
    pub fn is_empty(&self) -> bool {
        !self.has_spans() && !self.is_index && !self.is_supplement && self.remainder.is_empty()
    }

    /// `raw` 以外が同じなら同じ巻を指す
    pub fn same_unit(&self, other: &LabelRecord) -> bool {
        self.structural_key() == other.structural_key()
    }

    fn structural_key(&self) -> StructuralKey {
        StructuralKey {
            series: self.series,
            volume: self.volume,
            number: self.number,
            part: self.part,
            date: self.date,
            copy: self.copy,
            is_index: self.is_index,
            is_supplement: self.is_supplement,
            remainder: self.remainder.clone(),
        }
    }
}

#[derive(PartialEq, Eq, Hash)]
struct StructuralKey {
    series: Option<Span>,
    volume: Option<Span>,
    number: Option<Span>,
    part: Option<Span>,
    date: Option<DateSpan>,
    copy: Option<Span>,
    is_index: bool,
    is_supplement: bool,
    remainder: String,
}

/// 生ラベルの重複除去（トリム・空要素除外・初出順を保持）
pub fn dedupe_raw<'a, I>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    labels
        .into_iter()
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .filter(|label| seen.insert(*label))
        .map(str::to_string)
        .collect()
}

/// 重複除去済みのラベル集合
#[derive(Debug, Clone, Default, Serialize)]
pub struct LabelSet {
    records: Vec<LabelRecord>,
}

impl LabelSet {
    /// 生ラベルを重複除去して抽出し、同じ構造のレコードをさらに除去する
    pub fn extract<'a, I>(labels: I, extractor: &SpanExtractor) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let mut records: Vec<LabelRecord> = Vec::new();
        for raw in dedupe_raw(labels) {
            let record = extractor.extract(&raw);
            if !seen.insert(record.structural_key()) {
                tracing::debug!(label = %raw, "duplicate label dropped");
                continue;
            }
            records.push(record);
        }
        Self { records }
    }

    /// 抽出済みレコードから構築（重複除去は呼び出し側の責任）
    pub fn from_records(records: Vec<LabelRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[LabelRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabelRecord> {
        self.records.iter()
    }
}
