//! 照合戦略の実装

use super::MatchStrategy;
use crate::record::LabelRecord;
use crate::span::Category;

/// 値のあるフィールドの集合が同じで、すべて区間として等しいときだけ一致
#[derive(Debug, Clone, Copy)]
pub struct ExactMatch;

impl MatchStrategy for ExactMatch {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn score(&self, user: &LabelRecord, catalog: &LabelRecord) -> f64 {
        let spans_equal = Category::ALL
            .iter()
            .all(|c| user.span(*c) == catalog.span(*c));
        let flags_equal =
            user.is_index == catalog.is_index && user.is_supplement == catalog.is_supplement;
        // スパンが1つもないラベル同士は残りテキストで区別する
        let text_equal = user.has_spans() || user.remainder == catalog.remainder;

        if spans_equal && flags_equal && text_equal {
            1.0
        } else {
            0.0
        }
    }

    fn is_match(&self, score: f64) -> bool {
        score >= 1.0
    }
}

/// カテゴリ別の重なり率の上位 `top` 件の平均をスコアにする
///
/// `top = 1` が `1-span`、`top = 2` が `2-span`。
/// 足りない分は0として数えるので、2-span で1カテゴリだけの一致は最大50%。
#[derive(Debug, Clone, Copy)]
pub struct SpanCoverage {
    top: usize,
    name: &'static str,
}

impl SpanCoverage {
    pub const ONE: SpanCoverage = SpanCoverage { top: 1, name: "1-span" };
    pub const TWO: SpanCoverage = SpanCoverage { top: 2, name: "2-span" };
}

/// カテゴリ別の重なり率（どちらかに値がなければ0）
pub fn category_coverages(user: &LabelRecord, catalog: &LabelRecord) -> [f64; 6] {
    Category::ALL.map(|c| match (user.span(c), catalog.span(c)) {
        (Some(a), Some(b)) => a.coverage(&b),
        _ => 0.0,
    })
}

impl MatchStrategy for SpanCoverage {
    fn name(&self) -> &'static str {
        self.name
    }

    fn score(&self, user: &LabelRecord, catalog: &LabelRecord) -> f64 {
        let mut coverages = category_coverages(user, catalog);
        coverages.sort_by(|a, b| b.total_cmp(a));
        coverages.iter().take(self.top).sum::<f64>() / self.top as f64
    }

    fn is_match(&self, score: f64) -> bool {
        score > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{ExtractorOptions, SpanExtractor};
    use crate::vocabulary::Vocabulary;

    fn extract(label: &str) -> LabelRecord {
        SpanExtractor::new(&Vocabulary::standard(), ExtractorOptions::default())
            .unwrap()
            .extract(label)
    }

    #[test]
    fn test_exact_equivalent_labels() {
        let score = ExactMatch.score(&extract("V1"), &extract("Vol.1"));
        assert!(ExactMatch.is_match(score));
    }

    #[test]
    fn test_exact_rejects_subset() {
        let score = ExactMatch.score(&extract("V.1 NO.1"), &extract("V.1"));
        assert!(!ExactMatch.is_match(score));
    }

    #[test]
    fn test_exact_symmetric() {
        let labels = ["v.1", "V.1 NO.1", "1901-1933 v.4 pt.1", "eastern division", "western division", "index v.1"];
        for a in labels {
            for b in labels {
                assert_eq!(
                    ExactMatch.score(&extract(a), &extract(b)),
                    ExactMatch.score(&extract(b), &extract(a)),
                    "asymmetric for {a:?} / {b:?}"
                );
            }
        }
    }

    #[test]
    fn test_exact_unparsed_labels_compare_text() {
        assert_eq!(ExactMatch.score(&extract("eastern division"), &extract("Eastern  Division")), 1.0);
        assert_eq!(ExactMatch.score(&extract("eastern division"), &extract("western division")), 0.0);
    }

    #[test]
    fn test_exact_flags_must_agree() {
        assert_eq!(ExactMatch.score(&extract("v.1 index"), &extract("v.1")), 0.0);
    }

    #[test]
    fn test_one_span_best_category() {
        // 巻は一致、日付は不一致 → 最大値1.0
        let score = SpanCoverage::ONE.score(&extract("v.1 1991"), &extract("v.1 1992"));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_one_span_partial_range() {
        let score = SpanCoverage::ONE.score(&extract("v.1-4"), &extract("v.3-6"));
        assert!((score - 2.0 / 6.0).abs() < 1e-9);
        assert!(SpanCoverage::ONE.is_match(score));
    }

    #[test]
    fn test_one_span_disjoint() {
        let score = SpanCoverage::ONE.score(&extract("v.1"), &extract("v.2"));
        assert_eq!(score, 0.0);
        assert!(!SpanCoverage::ONE.is_match(score));
    }

    #[test]
    fn test_two_span_single_category_capped() {
        let score = SpanCoverage::TWO.score(&extract("v.1"), &extract("v.1"));
        assert_eq!(score, 0.5);
        let score = SpanCoverage::TWO.score(&extract("v.1 pt.2"), &extract("v.1 pt.2"));
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_two_span_never_exceeds_one_span() {
        let labels = ["v.1", "v.1 pt.1", "v.1-3 1990", "no.2 pt.1", "no.2", "1991-1992", "1991", "ser.2 v.17 (1891)"];
        for a in labels {
            for b in labels {
                let (ua, cb) = (extract(a), extract(b));
                assert!(
                    SpanCoverage::TWO.score(&ua, &cb) <= SpanCoverage::ONE.score(&ua, &cb),
                    "2-span > 1-span for {a:?} / {b:?}"
                );
            }
        }
    }
}
