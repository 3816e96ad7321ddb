//! 区間型（数値スパン・日付スパン）とカテゴリ定義

use chrono::NaiveDate;
use serde::Serialize;

/// 巻号表示のカテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Series,
    Volume,
    Number,
    Part,
    Date,
    Copy,
}

impl Category {
    /// 出力・比較に使う固定順
    pub const ALL: [Category; 6] = [
        Category::Series,
        Category::Volume,
        Category::Number,
        Category::Part,
        Category::Date,
        Category::Copy,
    ];

    /// 抽出の優先順（日付が最優先）
    pub const EXTRACTION_ORDER: [Category; 6] = [
        Category::Date,
        Category::Series,
        Category::Volume,
        Category::Number,
        Category::Part,
        Category::Copy,
    ];

    /// 正規化後のキーワード（日付にはない）
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Category::Series => Some("series"),
            Category::Volume => Some("volume"),
            Category::Number => Some("number"),
            Category::Part => Some("part"),
            Category::Copy => Some("copy"),
            Category::Date => None,
        }
    }

    /// キーワードからカテゴリを逆引き
    pub fn from_keyword(word: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.keyword() == Some(word))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Series => write!(f, "series"),
            Category::Volume => write!(f, "volume"),
            Category::Number => write!(f, "number"),
            Category::Part => write!(f, "part"),
            Category::Date => write!(f, "date"),
            Category::Copy => write!(f, "copy"),
        }
    }
}

/// 閉区間 `[low, high]` の整数スパン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    low: u32,
    high: u32,
}

impl Span {
    /// スパンを生成する
    ///
    /// # Panics
    /// `low > high` の場合（呼び出し側の契約違反）
    pub fn new(low: u32, high: u32) -> Self {
        assert!(low <= high, "span invariant violated: {low} > {high}");
        Self { low, high }
    }

    /// 単一値 `(n, n)`
    pub fn single(n: u32) -> Self {
        Self { low: n, high: n }
    }

    /// 入力テキスト由来の値用。逆転していれば `None`
    pub fn checked(low: u32, high: u32) -> Option<Self> {
        (low <= high).then_some(Self { low, high })
    }

    pub fn low(&self) -> u32 {
        self.low
    }

    pub fn high(&self) -> u32 {
        self.high
    }

    /// 重なり率（0.0〜1.0）
    pub fn coverage(&self, other: &Span) -> f64 {
        overlap_ratio(
            (self.low as i64, self.high as i64),
            (other.low as i64, other.high as i64),
        )
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.low == self.high {
            write!(f, "{}", self.low)
        } else {
            write!(f, "{}-{}", self.low, self.high)
        }
    }
}

/// 閉区間 `[start, end]` の日付スパン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateSpan {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateSpan {
    /// # Panics
    /// `start > end` の場合
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        assert!(start <= end, "date span invariant violated: {start} > {end}");
        Self { start, end }
    }

    pub fn checked(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// 日単位の重なり率
    pub fn coverage(&self, other: &DateSpan) -> f64 {
        let day = |d: NaiveDate| d.signed_duration_since(NaiveDate::MIN).num_days();
        overlap_ratio(
            (day(self.start), day(self.end)),
            (day(other.start), day(other.end)),
        )
    }
}

impl std::fmt::Display for DateSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.start, self.end)
    }
}

/// `max(0, min(a2,b2) - max(a1,b1) + 1) / (max(a2,b2) - min(a1,b1) + 1)`
fn overlap_ratio(a: (i64, i64), b: (i64, i64)) -> f64 {
    let overlap = (a.1.min(b.1) - a.0.max(b.0) + 1).max(0);
    let hull = a.1.max(b.1) - a.0.min(b.0) + 1;
    overlap as f64 / hull as f64
}
