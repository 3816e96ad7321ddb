//! タブ区切りテキストの読み書き
//!
//! 書式は固定: タブ区切り、1行目がヘッダ、引用符の解釈なし。

use crate::error::{AppError, Result};
use enumcron_common::MatchReport;
use std::io::{Read, Write};
use std::path::Path;

/// 追加する列: 一致率
pub const PERCENT_COLUMN: &str = "volume-match-pct";
/// 追加する列: ラベルごとの対応
pub const MATCHES_COLUMN: &str = "enumcron-matches";

/// 出力セル内の区切り
const LIST_SEPARATOR: &str = "; ";
const NO_MATCH: &str = "(no match)";

/// ヘッダ付きの表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn read_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AppError::FileNotFound(path.display().to_string()));
        }
        let file = std::fs::File::open(path)?;
        Self::read_from(file)
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .quoting(false)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    /// 列名から位置を取得
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AppError::MissingColumn {
                column: name.to_string(),
                available: self.headers.join(", "),
            })
    }

    /// 行のセル（短い行は空文字）
    pub fn cell<'a>(&self, row: &'a [String], column: usize) -> &'a str {
        row.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Never)
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::File::create(path)?;
        self.write_to(std::io::BufWriter::new(file))
    }
}

/// セル内の繰り返し値を分割する
///
/// `"v.1";"v.2"` と `v.1; v.2` のどちらも受け付ける。
pub fn split_repeated(cell: &str) -> Vec<&str> {
    cell.split(';')
        .map(|item| item.trim().trim_matches('"').trim())
        .filter(|item| !item.is_empty())
        .collect()
}

/// 指定列の繰り返し値を行順に並べる
pub fn column_values<'a>(table: &'a Table, name: &str) -> Result<Vec<&'a str>> {
    let column = table.column_index(name)?;
    Ok(table
        .rows
        .iter()
        .flat_map(|row| split_repeated(table.cell(row, column)))
        .collect())
}

/// `volume-match-pct` 列の値
pub fn format_percent(report: Option<&MatchReport>) -> String {
    report.map(MatchReport::percent_display).unwrap_or_default()
}

/// `enumcron-matches` 列の値
pub fn format_matches(report: Option<&MatchReport>) -> String {
    let Some(report) = report else {
        return String::new();
    };
    report
        .matched_raw()
        .into_iter()
        .map(|(user, catalog)| format!("{user} => {}", catalog.unwrap_or(NO_MATCH)))
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}
