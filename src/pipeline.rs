//! 表の各行に照合をかける

use crate::config::Config;
use crate::error::Result;
use crate::table::{self, split_repeated, Table, MATCHES_COLUMN, PERCENT_COLUMN};
use enumcron_common::{
    match_labels, strategy_by_name, LabelSet, MatchReport, MatchStrategy, SpanExtractor,
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rayon::prelude::*;
use std::path::Path;

/// 実行ごとに一度だけ解決する照合設定
pub struct MatchJob {
    strategy: &'static dyn MatchStrategy,
    extractor: SpanExtractor,
    pub volume_column: String,
    pub enumcron_column: String,
}

/// CLI から上書きできる項目
#[derive(Debug, Clone, Default)]
pub struct JobOverrides<'a> {
    pub strategy: Option<&'a str>,
    pub volume_column: Option<&'a str>,
    pub enumcron_column: Option<&'a str>,
    pub vocabulary: Option<&'a Path>,
}

/// 実行結果の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    /// 所蔵ラベルのある行
    pub judged: usize,
    /// 全ラベルが対応した行
    pub fully_matched: usize,
}

impl MatchJob {
    pub fn new(config: &Config, overrides: &JobOverrides) -> Result<Self> {
        let strategy = strategy_by_name(overrides.strategy.unwrap_or(&config.default_strategy))?;
        let extractor = config.extractor(overrides.vocabulary)?;

        Ok(Self {
            strategy,
            extractor,
            volume_column: overrides
                .volume_column
                .unwrap_or(&config.volume_column)
                .to_string(),
            enumcron_column: overrides
                .enumcron_column
                .unwrap_or(&config.enumcron_column)
                .to_string(),
        })
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn extractor(&self) -> &SpanExtractor {
        &self.extractor
    }

    /// 1行分の照合（所蔵ラベルがなければ None）
    pub fn match_cells(&self, user_cell: &str, catalog_cell: &str) -> Option<MatchReport> {
        let user = LabelSet::extract(split_repeated(user_cell), &self.extractor);
        if user.is_empty() {
            return None;
        }
        let catalog = LabelSet::extract(split_repeated(catalog_cell), &self.extractor);
        Some(match_labels(user.records(), catalog.records(), self.strategy))
    }

    /// 全行を照合し、列を2つ足した表を返す
    pub fn run(&self, input: &Table, progress: bool) -> Result<(Table, RunSummary)> {
        let user_column = input.column_index(&self.volume_column)?;
        let catalog_column = input.column_index(&self.enumcron_column)?;

        let pb = create_progress_bar(input.rows.len() as u64, progress);

        let reports: Vec<Option<MatchReport>> = input
            .rows
            .par_iter()
            .enumerate()
            .map(|(index, row)| {
                let report = self.match_cells(
                    input.cell(row, user_column),
                    input.cell(row, catalog_column),
                );
                if let Some(report) = &report {
                    if report.missed_count() > 0 {
                        tracing::info!(
                            row = index + 1,
                            "missed {} of {}",
                            report.missed_count(),
                            report.total_count
                        );
                    }
                }
                pb.inc(1);
                report
            })
            .collect();

        pb.finish_and_clear();

        let width = input.headers.len();
        let mut headers = input.headers.clone();
        headers.push(PERCENT_COLUMN.to_string());
        headers.push(MATCHES_COLUMN.to_string());

        let mut summary = RunSummary {
            rows: input.rows.len(),
            ..RunSummary::default()
        };

        let rows = input
            .rows
            .iter()
            .zip(&reports)
            .enumerate()
            .map(|(index, (row, report))| {
                if let Some(report) = report {
                    summary.judged += 1;
                    if report.missed_count() == 0 {
                        summary.fully_matched += 1;
                    }
                }
                if row.len() > width {
                    tracing::warn!(
                        row = index + 1,
                        cells = row.len(),
                        columns = width,
                        "extra cells beyond the header dropped"
                    );
                }
                let mut row = row.clone();
                row.resize(width, String::new());
                row.push(table::format_percent(report.as_ref()));
                row.push(table::format_matches(report.as_ref()));
                row
            })
            .collect();

        tracing::info!(
            strategy = self.strategy_name(),
            rows = summary.rows,
            judged = summary.judged,
            fully_matched = summary.fully_matched,
            "match run finished"
        );

        Ok((Table { headers, rows }, summary))
    }
}

fn create_progress_bar(len: u64, visible: bool) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if !visible {
        pb.set_draw_target(ProgressDrawTarget::hidden());
        return pb;
    }
    if let Ok(style) =
        ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message("照合中");
    pb
}
