//! 年・日付表現の解析
//!
//! 対応形式（正規化済みテキスト上）:
//! - `1900` → 1900-01-01 〜 1900-12-31
//! - `1926-27` / `1926/27` / `2002-2003` → 年の範囲（2桁は前の年の世紀を借りる）
//! - `yr. 1900` / `c1900` → 接頭辞 `yr.` と直結した `c` は読み飛ばす
//! - `dec 1999` / `jan-jun 1999` → 月で端点を狭める
//! - `1999-03-15` → 1日だけの区間

use crate::span::{Category, DateSpan};
use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::ops::Range;

const MONTHS: &str = "january|february|march|april|june|july|august|september|october|november|december|sept|jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec";

lazy_static::lazy_static! {
    static ref DATE_RE: Regex = Regex::new(&format!(
        r"\b(?:(?P<fy>[0-9]{{4}})-(?P<fm>[0-9]{{2}})-(?P<fd>[0-9]{{2}})|(?:yr\.?\s?|c)?(?:(?P<m1>{months})\.?(?:\s?[-/]\s?(?P<m2>{months})\.?)?\s)?(?P<y1>[0-9]{{4}})(?:\s?[-/]\s?(?P<y2>[0-9]{{4}}|[0-9]{{2}}))?)\b",
        months = MONTHS
    )).unwrap();
    /// `volume 1-` のようにキーワード範囲の上端が続く位置
    static ref KEYWORD_RANGE_TAIL_RE: Regex = Regex::new(
        r"(?:^|[^\p{Alphabetic}])(?:series|volume|number|part|copy)s?\.?\s?[0-9]+\s?-\s?$"
    ).unwrap();
}

/// 日付区間の抽出結果
#[derive(Debug, Clone, PartialEq)]
pub struct DateMatch {
    pub span: DateSpan,
    /// 元テキスト内のバイト範囲
    pub range: Range<usize>,
}

/// 日付スパン解析器
#[derive(Debug, Clone, Copy)]
pub struct DateSpanParser {
    min_year: i32,
    max_year: i32,
}

impl Default for DateSpanParser {
    fn default() -> Self {
        Self {
            min_year: 1400,
            max_year: 2100,
        }
    }
}

impl DateSpanParser {
    pub fn new(min_year: i32, max_year: i32) -> Self {
        Self { min_year, max_year }
    }

    /// テキスト中の最初の日付表現を探して解析する
    ///
    /// カテゴリ語の直後にある数字（`volume 1900`）は日付とみなさない。
    /// 最初の候補が不正（逆順・範囲外の年）なら `None` を返し、テキストは残る。
    pub fn extract(&self, text: &str) -> Option<DateMatch> {
        let caps = DATE_RE
            .captures_iter(text)
            .find(|caps| !follows_keyword(text, caps.get(0).map_or(0, |m| m.start())))?;

        let whole = caps.get(0)?;
        match self.span_from(&caps) {
            Some(span) => Some(DateMatch {
                span,
                range: whole.range(),
            }),
            None => {
                tracing::warn!(
                    label = text,
                    date = whole.as_str(),
                    "invalid date range, left in remainder"
                );
                None
            }
        }
    }

    /// 文字列全体を1つの日付表現として解析する
    pub fn parse(&self, expr: &str) -> Option<DateSpan> {
        let caps = DATE_RE.captures(expr)?;
        let whole = caps.get(0)?;
        if whole.start() != 0 || whole.end() != expr.len() {
            return None;
        }
        self.span_from(&caps)
    }

    fn span_from(&self, caps: &Captures) -> Option<DateSpan> {
        if let Some(year) = caps.name("fy") {
            let year = self.plausible_year(year.as_str())?;
            let month = caps.name("fm")?.as_str().parse().ok()?;
            let day = caps.name("fd")?.as_str().parse().ok()?;
            let date = NaiveDate::from_ymd_opt(year, month, day)?;
            return Some(DateSpan::new(date, date));
        }

        let start_year = self.plausible_year(caps.name("y1")?.as_str())?;
        let end_year = match caps.name("y2") {
            Some(y2) if y2.as_str().len() == 2 => {
                let short: i32 = y2.as_str().parse().ok()?;
                self.check_year(start_year / 100 * 100 + short)?
            }
            Some(y2) => self.plausible_year(y2.as_str())?,
            None => start_year,
        };

        let start_month = caps.name("m1").and_then(|m| month_number(m.as_str()));
        let end_month = caps
            .name("m2")
            .and_then(|m| month_number(m.as_str()))
            .or(start_month);

        let start = NaiveDate::from_ymd_opt(start_year, start_month.unwrap_or(1), 1)?;
        let end = last_day_of_month(end_year, end_month.unwrap_or(12))?;

        DateSpan::checked(start, end)
    }

    fn plausible_year(&self, digits: &str) -> Option<i32> {
        self.check_year(digits.parse().ok()?)
    }

    fn check_year(&self, year: i32) -> Option<i32> {
        (self.min_year..=self.max_year).contains(&year).then_some(year)
    }
}

/// 直前の語がカテゴリキーワード、またはキーワード範囲の途中かどうか
fn follows_keyword(text: &str, start: usize) -> bool {
    let before = &text[..start];
    KEYWORD_RANGE_TAIL_RE.is_match(before)
        || before
            .split_whitespace()
            .last()
            .is_some_and(|word| Category::from_keyword(word).is_some())
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    if month == 12 {
        return NaiveDate::from_ymd_opt(year, 12, 31);
    }
    NaiveDate::from_ymd_opt(year, month + 1, 1)?.pred_opt()
}
