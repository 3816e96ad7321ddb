//! 所蔵ラベルとカタログラベルの照合
//!
//! 戦略ごとに全ペアをスコアリングし、スコアの高い順に貪欲に1対1で割り当てる。

mod strategy;

pub use strategy::{category_coverages, ExactMatch, SpanCoverage};

use crate::error::{Error, Result};
use crate::record::LabelRecord;
use crate::report::{MatchPairing, MatchReport};
use rayon::prelude::*;

/// 照合戦略
pub trait MatchStrategy: Send + Sync {
    /// レポートに載せる戦略名
    fn name(&self) -> &'static str;

    /// 0.0〜1.0 のスコア
    fn score(&self, user: &LabelRecord, catalog: &LabelRecord) -> f64;

    /// このスコアを一致とみなすか
    fn is_match(&self, score: f64) -> bool;
}

/// 登録済み戦略（`1-range` / `2-range` は旧名）
pub static STRATEGIES: &[(&str, &dyn MatchStrategy)] = &[
    ("exact", &ExactMatch),
    ("1-span", &SpanCoverage::ONE),
    ("2-span", &SpanCoverage::TWO),
    ("1-range", &SpanCoverage::ONE),
    ("2-range", &SpanCoverage::TWO),
];

/// 名前から戦略を取得（大文字小文字・前後の空白は無視）
pub fn strategy_by_name(name: &str) -> Result<&'static dyn MatchStrategy> {
    let key = name.trim().to_lowercase();
    STRATEGIES
        .iter()
        .find(|(registered, _)| *registered == key)
        .map(|(_, strategy)| *strategy)
        .ok_or_else(|| Error::UnknownStrategy {
            name: name.to_string(),
            valid: strategy_names().join(", "),
        })
}

/// 正式な戦略名の一覧（旧名を除く）
pub fn strategy_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::new();
    for (name, strategy) in STRATEGIES {
        if *name == strategy.name() && !names.contains(name) {
            names.push(*name);
        }
    }
    names
}

/// 所蔵ラベル群をカタログラベル群に照合する
///
/// どちらも重複除去済みであること。
/// 各カタログラベルは高々1件の所蔵ラベルにしか割り当てない。
/// 同点は所蔵側の入力順、次にカタログ側の入力順で決まる。
pub fn match_labels(
    user: &[LabelRecord],
    catalog: &[LabelRecord],
    strategy: &dyn MatchStrategy,
) -> MatchReport {
    let mut candidates: Vec<(f64, usize, usize)> = user
        .par_iter()
        .enumerate()
        .flat_map_iter(|(ui, u)| {
            catalog.iter().enumerate().filter_map(move |(ci, c)| {
                let score = strategy.score(u, c);
                strategy.is_match(score).then_some((score, ui, ci))
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });

    let mut assigned: Vec<Option<(usize, f64)>> = vec![None; user.len()];
    let mut taken = vec![false; catalog.len()];
    for (score, ui, ci) in candidates {
        if assigned[ui].is_some() || taken[ci] {
            continue;
        }
        assigned[ui] = Some((ci, score));
        taken[ci] = true;
    }

    let pairings = user
        .iter()
        .zip(assigned)
        .map(|(u, slot)| MatchPairing {
            user: u.clone(),
            catalog: slot.map(|(ci, _)| catalog[ci].clone()),
            score: slot.map(|(_, score)| score),
        })
        .collect::<Vec<_>>();

    let report = MatchReport::new(strategy.name(), pairings);
    tracing::debug!(
        strategy = report.strategy.as_str(),
        matched = report.matched_count,
        total = report.total_count,
        "labels matched"
    );
    report
}

/// 戦略名を指定して照合する
pub fn match_labels_by_name(
    user: &[LabelRecord],
    catalog: &[LabelRecord],
    strategy: &str,
) -> Result<MatchReport> {
    Ok(match_labels(user, catalog, strategy_by_name(strategy)?))
}
