//! スパン抽出（SpanExtractor）
//!
//! 正規化済みラベルに対してカテゴリ別の規則を固定の優先順で適用する。
//! 一致した部分は消費され、後のカテゴリは同じ文字列を取れない。
//!
//! ## 処理フロー
//! 1. 正規化（Normalizer）
//! 2. 日付 → 系列 → 巻 → 号 → 部 → 複本 の順に1つずつ抽出
//! 3. 残りのテキストから索引・補遺の語を検出
//! 4. 取られなかったテキストを remainder とする

use crate::date::DateSpanParser;
use crate::error::{Error, Result};
use crate::normalizer::{collapse_whitespace, Normalizer};
use crate::record::LabelRecord;
use crate::span::{Category, DateSpan, Span};
use crate::vocabulary::Vocabulary;
use regex::Regex;
use std::ops::Range;

/// remainder の前後から取り除く文字
const REMAINDER_TRIM: &[char] = &[' ', ',', ';', ':', '.', '-', '(', ')', '[', ']'];

/// 抽出オプション
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorOptions {
    /// 年として認める下限
    pub min_year: i32,
    /// 年として認める上限
    pub max_year: i32,
    /// キーワードのない数字だけのラベル（`4`）を巻とみなす
    pub bare_number_as_volume: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            min_year: 1400,
            max_year: 2100,
            bare_number_as_volume: false,
        }
    }
}

/// 規則1件の一致結果
#[derive(Debug, Clone, PartialEq)]
enum Extracted {
    Numeric(Span),
    Date(DateSpan),
}

#[derive(Debug, Clone, PartialEq)]
struct RuleMatch {
    value: Extracted,
    range: Range<usize>,
}

type RuleFn = fn(&SpanExtractor, &str) -> Option<RuleMatch>;

/// 優先順の規則表
const RULES: [(Category, RuleFn); 6] = [
    (Category::Date, date_rule),
    (Category::Series, series_rule),
    (Category::Volume, volume_rule),
    (Category::Number, number_rule),
    (Category::Part, part_rule),
    (Category::Copy, copy_rule),
];

lazy_static::lazy_static! {
    static ref SERIES_RE: Regex = keyword_regex("series");
    static ref VOLUME_RE: Regex = keyword_regex("volume");
    static ref NUMBER_RE: Regex = keyword_regex("number");
    static ref PART_RE: Regex = keyword_regex("part");
    static ref COPY_RE: Regex = keyword_regex("copy");
    static ref EMPTY_BRACKETS_RE: Regex = Regex::new(r"\(\s*\)|\[\s*\]").unwrap();
    static ref BARE_NUMBER_RE: Regex = Regex::new(r"^\(?([0-9]{1,3})\)?$").unwrap();
}

/// `volume 4` / `volumes 4-5` / `volume4`
fn keyword_regex(keyword: &str) -> Regex {
    Regex::new(&format!(r"\b{keyword}s?\.?\s?([0-9]+)(?:\s?-\s?([0-9]+))?")).unwrap()
}

fn date_rule(extractor: &SpanExtractor, text: &str) -> Option<RuleMatch> {
    extractor.dates.extract(text).map(|found| RuleMatch {
        value: Extracted::Date(found.span),
        range: found.range,
    })
}

fn series_rule(_: &SpanExtractor, text: &str) -> Option<RuleMatch> {
    keyword_rule(&SERIES_RE, text)
}

fn volume_rule(_: &SpanExtractor, text: &str) -> Option<RuleMatch> {
    keyword_rule(&VOLUME_RE, text)
}

fn number_rule(_: &SpanExtractor, text: &str) -> Option<RuleMatch> {
    keyword_rule(&NUMBER_RE, text)
}

fn part_rule(_: &SpanExtractor, text: &str) -> Option<RuleMatch> {
    keyword_rule(&PART_RE, text)
}

fn copy_rule(_: &SpanExtractor, text: &str) -> Option<RuleMatch> {
    keyword_rule(&COPY_RE, text)
}

/// 最初の出現だけを見る。逆順の範囲（`5-4`）は不一致扱い
fn keyword_rule(re: &Regex, text: &str) -> Option<RuleMatch> {
    let caps = re.captures(text)?;
    let whole = caps.get(0)?;
    let bounds = (
        caps[1].parse::<u32>(),
        caps.get(2).map(|end| end.as_str().parse::<u32>()),
    );
    let (low, high) = match bounds {
        (Ok(low), None) => (low, low),
        (Ok(low), Some(Ok(high))) => (low, high),
        _ => {
            tracing::warn!(
                label = text,
                span = whole.as_str(),
                "number out of range, left in remainder"
            );
            return None;
        }
    };

    match Span::checked(low, high) {
        Some(span) => Some(RuleMatch {
            value: Extracted::Numeric(span),
            range: whole.range(),
        }),
        None => {
            tracing::warn!(
                label = text,
                span = whole.as_str(),
                "reversed range, left in remainder"
            );
            None
        }
    }
}

/// スパン抽出器
#[derive(Debug, Clone)]
pub struct SpanExtractor {
    normalizer: Normalizer,
    dates: DateSpanParser,
    index_re: Option<Regex>,
    supplement_re: Option<Regex>,
    options: ExtractorOptions,
}

impl SpanExtractor {
    /// 語彙とオプションから抽出器を構築
    pub fn new(vocabulary: &Vocabulary, options: ExtractorOptions) -> Result<Self> {
        vocabulary.validate()?;
        if options.min_year > options.max_year {
            return Err(Error::Config(format!(
                "min_year {} is greater than max_year {}",
                options.min_year, options.max_year
            )));
        }

        Ok(Self {
            normalizer: Normalizer::new(vocabulary)?,
            dates: DateSpanParser::new(options.min_year, options.max_year),
            index_re: term_regex(&vocabulary.index_terms)?,
            supplement_re: term_regex(&vocabulary.supplement_terms)?,
            options,
        })
    }

    pub fn options(&self) -> &ExtractorOptions {
        &self.options
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// 生ラベルから LabelRecord を作る
    pub fn extract(&self, raw: &str) -> LabelRecord {
        let normalized = self.normalizer.normalize(raw);
        let mut record = LabelRecord {
            raw: raw.to_string(),
            series: None,
            volume: None,
            number: None,
            part: None,
            date: None,
            copy: None,
            is_index: false,
            is_supplement: false,
            remainder: String::new(),
        };

        if self.options.bare_number_as_volume {
            if let Some(caps) = BARE_NUMBER_RE.captures(&normalized) {
                if let Ok(n) = caps[1].parse() {
                    record.volume = Some(Span::single(n));
                    return record;
                }
            }
        }

        let mut working = normalized.clone();

        for (category, rule) in RULES {
            let Some(found) = rule(self, &working) else {
                continue;
            };
            match (category, found.value) {
                (Category::Date, Extracted::Date(span)) => record.date = Some(span),
                (Category::Series, Extracted::Numeric(span)) => record.series = Some(span),
                (Category::Volume, Extracted::Numeric(span)) => record.volume = Some(span),
                (Category::Number, Extracted::Numeric(span)) => record.number = Some(span),
                (Category::Part, Extracted::Numeric(span)) => record.part = Some(span),
                (Category::Copy, Extracted::Numeric(span)) => record.copy = Some(span),
                (category, value) => {
                    unreachable!("rule for {category} produced {value:?}")
                }
            }
            working.replace_range(found.range, " ");
        }

        record.is_index = consume(self.index_re.as_ref(), &mut working);
        record.is_supplement = consume(self.supplement_re.as_ref(), &mut working);

        record.remainder = clean_remainder(&working);
        if record.is_empty() {
            // 記号だけのラベルは正規化後の文字列をそのまま残す
            record.remainder = normalized;
        }

        debug_assert!(
            raw.trim().is_empty() || !record.is_empty(),
            "non-blank label {raw:?} produced an empty record"
        );

        tracing::debug!(
            label = raw,
            populated = ?record.populated(),
            remainder = %record.remainder,
            "label extracted"
        );

        record
    }
}

/// 判定語の正規表現（長い語を先に試す）
fn term_regex(terms: &[String]) -> Result<Option<Regex>> {
    if terms.is_empty() {
        return Ok(None);
    }
    let mut terms: Vec<String> = terms.iter().map(|t| t.trim().to_lowercase()).collect();
    terms.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let alternation = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");

    Regex::new(&format!(r"\b(?:{alternation})\b[.:]?"))
        .map(Some)
        .map_err(|e| Error::Config(format!("index/supplement terms: {e}")))
}

/// 最初の一致を消費して true を返す
fn consume(re: Option<&Regex>, working: &mut String) -> bool {
    let Some(range) = re.and_then(|re| re.find(working)).map(|m| m.range()) else {
        return false;
    };
    working.replace_range(range, " ");
    true
}

fn clean_remainder(working: &str) -> String {
    let collapsed = collapse_whitespace(working);
    let without_brackets = EMPTY_BRACKETS_RE.replace_all(&collapsed, " ");
    collapse_whitespace(&without_brackets)
        .trim_matches(REMAINDER_TRIM)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn extractor() -> SpanExtractor {
        SpanExtractor::new(&Vocabulary::standard(), ExtractorOptions::default()).unwrap()
    }

    fn years(start: i32, end: i32) -> Option<DateSpan> {
        Some(DateSpan::new(
            NaiveDate::from_ymd_opt(start, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(end, 12, 31).unwrap(),
        ))
    }

    #[test]
    fn test_date_volume_part() {
        let record = extractor().extract("1901-1933 v.4 pt.1");
        assert_eq!(record.volume, Some(Span::single(4)));
        assert_eq!(record.part, Some(Span::single(1)));
        assert_eq!(record.date, years(1901, 1933));
        assert_eq!(record.series, None);
        assert_eq!(record.number, None);
        assert_eq!(record.copy, None);
        assert_eq!(record.remainder, "");
        assert_eq!(record.raw, "1901-1933 v.4 pt.1");
    }

    #[test]
    fn test_series_volume_date() {
        let record = extractor().extract("Ser.2 v.17 (1891)");
        assert_eq!(record.series, Some(Span::single(2)));
        assert_eq!(record.volume, Some(Span::single(17)));
        assert_eq!(record.date, years(1891, 1891));
        assert_eq!(record.number, None);
        assert_eq!(record.part, None);
        assert_eq!(record.copy, None);
        assert_eq!(record.remainder, "");
    }

    #[test]
    fn test_unparsed_text_is_remainder() {
        let record = extractor().extract("eastern division");
        assert!(!record.has_spans());
        assert_eq!(record.remainder, "eastern division");
    }

    #[test]
    fn test_simple_forms() {
        let ex = extractor();
        assert_eq!(ex.extract("v.1").volume, Some(Span::single(1)));
        assert_eq!(ex.extract("v. 1").volume, Some(Span::single(1)));
        assert_eq!(ex.extract("V. 123").volume, Some(Span::single(123)));
        assert_eq!(ex.extract("NO. 1").number, Some(Span::single(1)));
        assert_eq!(ex.extract("pt. 1").part, Some(Span::single(1)));
        assert_eq!(ex.extract("c.2").copy, Some(Span::single(2)));
        assert_eq!(ex.extract("1926-27").date, years(1926, 1927));
    }

    #[test]
    fn test_ranges() {
        let ex = extractor();
        assert_eq!(ex.extract("v.4-5").volume, Some(Span::new(4, 5)));
        assert_eq!(ex.extract("no. 1 - 12").number, Some(Span::new(1, 12)));
    }

    #[test]
    fn test_reversed_range_is_parse_miss() {
        let record = extractor().extract("v.5-4");
        assert_eq!(record.volume, None);
        assert_eq!(record.remainder, "volume 5-4");
    }

    #[test]
    fn test_invalid_date_stays_in_remainder() {
        let record = extractor().extract("v.2 1933-1901");
        assert_eq!(record.volume, Some(Span::single(2)));
        assert_eq!(record.date, None);
        assert_eq!(record.remainder, "1933-1901");
    }

    #[test]
    fn test_keyword_number_is_not_a_date() {
        let record = extractor().extract("v.1900");
        assert_eq!(record.volume, Some(Span::single(1900)));
        assert_eq!(record.date, None);
    }

    #[test]
    fn test_index_and_supplement() {
        let ex = extractor();
        let index = ex.extract("Index v.1-10");
        assert!(index.is_index);
        assert_eq!(index.volume, Some(Span::new(1, 10)));
        assert_eq!(index.remainder, "");

        let suppl = ex.extract("v.3 suppl.");
        assert!(suppl.is_supplement);
        assert!(!suppl.is_index);
        assert_eq!(suppl.remainder, "");
    }

    #[test]
    fn test_bare_number_defaults_to_remainder() {
        let record = extractor().extract("4");
        assert_eq!(record.volume, None);
        assert_eq!(record.remainder, "4");
    }

    #[test]
    fn test_bare_number_as_volume_option() {
        let options = ExtractorOptions {
            bare_number_as_volume: true,
            ..Default::default()
        };
        let ex = SpanExtractor::new(&Vocabulary::standard(), options).unwrap();
        assert_eq!(ex.extract("4").volume, Some(Span::single(4)));
        assert_eq!(ex.extract("(12)").volume, Some(Span::single(12)));
        // 年は日付のまま
        assert_eq!(ex.extract("1900").volume, None);
        assert_eq!(ex.extract("1900").date, years(1900, 1900));
    }

    #[test]
    fn test_punctuation_only_label_keeps_text() {
        let record = extractor().extract("()");
        assert!(!record.is_empty());
        assert_eq!(record.remainder, "()");
    }

    #[test]
    fn test_completeness() {
        let ex = extractor();
        let samples = [
            "v.1", "1900", "eastern division", "index", "-", "[ ]", "v.5-4",
            "c. 1 v. 2, 1991.", "Jahrg.3 Bd.2", "n.s. v.3", "dec 1999", "4",
        ];
        for s in samples {
            assert!(!ex.extract(s).is_empty(), "empty record for {s:?}");
        }
    }

    #[test]
    fn test_german_forms() {
        let record = extractor().extract("Jahrg.3 Bd.2");
        assert_eq!(record.volume, Some(Span::single(3)));
        assert_eq!(record.part, Some(Span::single(2)));
    }

    #[test]
    fn test_rejects_bad_year_range() {
        let options = ExtractorOptions {
            min_year: 2000,
            max_year: 1900,
            ..Default::default()
        };
        let result = SpanExtractor::new(&Vocabulary::standard(), options);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_keyword_range_reaching_year() {
        let ex = extractor();
        let record = ex.extract("v.1-1900");
        assert_eq!(record.volume, Some(Span::new(1, 1900)));
        assert_eq!(record.date, None);
        assert_eq!(record.remainder, "");

        let record = ex.extract("no.1-1500 1950");
        assert_eq!(record.number, Some(Span::new(1, 1500)));
        assert_eq!(record.date, years(1950, 1950));
    }

    #[test]
    fn test_new_series_sets_no_series() {
        let ex = extractor();
        for label in ["n.s. 3", "n.s.3", "nser 3"] {
            let record = ex.extract(label);
            assert_eq!(record.series, None, "series set for {label:?}");
            assert!(!record.remainder.is_empty());
        }
        let record = ex.extract("n.s. v.3");
        assert_eq!(record.series, None);
        assert_eq!(record.volume, Some(Span::single(3)));
        assert_eq!(record.remainder, "n.s");
        assert_eq!(ex.extract("ser.3").series, Some(Span::single(3)));
    }

    #[test]
    fn test_circa_year_is_date() {
        let record = extractor().extract("c1990");
        assert_eq!(record.copy, None);
        assert_eq!(record.date, years(1990, 1990));
        assert_eq!(record.remainder, "");
        assert_eq!(extractor().extract("c.2").copy, Some(Span::single(2)));
    }

    #[test]
    fn test_unparseable_numbers_stay_in_remainder() {
        let ex = extractor();
        let record = ex.extract("v.99999999999");
        assert_eq!(record.volume, None);
        assert_eq!(record.remainder, "volume 99999999999");

        let record = ex.extract("v.１");
        assert_eq!(record.volume, None);
        assert_eq!(record.remainder, "v.１");
    }

    #[test]
    fn test_first_occurrence_only() {
        let record = extractor().extract("v.1 v.2");
        assert_eq!(record.volume, Some(Span::single(1)));
        assert_eq!(record.remainder, "volume 2");
    }
}
