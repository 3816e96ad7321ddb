//! 照合結果の集計

use crate::record::LabelRecord;
use serde::Serialize;

/// 所蔵ラベル1件とカタログラベル（最大1件）の対応
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchPairing {
    pub user: LabelRecord,
    pub catalog: Option<LabelRecord>,
    /// 対応を決めたスコア（未対応なら None）
    pub score: Option<f64>,
}

impl MatchPairing {
    pub fn is_matched(&self) -> bool {
        self.catalog.is_some()
    }
}

/// 照合レポート
///
/// `pairings` は重複除去後の所蔵ラベルの入力順。
/// `percent` は丸めずに保持し、表示時にだけ丸める。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub strategy: String,
    pub pairings: Vec<MatchPairing>,
    pub matched_count: usize,
    pub total_count: usize,
    pub percent: f64,
}

impl MatchReport {
    pub fn new(strategy: &str, pairings: Vec<MatchPairing>) -> Self {
        let matched_count = pairings.iter().filter(|p| p.is_matched()).count();
        let total_count = pairings.len();
        let percent = if total_count > 0 {
            matched_count as f64 / total_count as f64 * 100.0
        } else {
            0.0
        };

        Self {
            strategy: strategy.to_string(),
            pairings,
            matched_count,
            total_count,
            percent,
        }
    }

    /// 判定対象がない（所蔵ラベルが空）
    pub fn is_vacuous(&self) -> bool {
        self.total_count == 0
    }

    pub fn missed_count(&self) -> usize {
        self.total_count - self.matched_count
    }

    /// 小数1桁の表示用文字列
    pub fn percent_display(&self) -> String {
        format!("{:.1}", self.percent)
    }

    /// `(所蔵ラベル, 対応したカタログラベル)` の生文字列
    pub fn matched_raw(&self) -> Vec<(&str, Option<&str>)> {
        self.pairings
            .iter()
            .map(|p| (p.user.raw.as_str(), p.catalog.as_ref().map(|c| c.raw.as_str())))
            .collect()
    }
}
