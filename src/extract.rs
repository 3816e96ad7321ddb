//! ラベル1行ごとの抽出結果を出力する（診断用）

use crate::cli::OutputFormat;
use crate::error::Result;
use enumcron_common::{Category, LabelRecord, SpanExtractor};
use std::io::{BufRead, Write};

/// 1行1ラベルで読む（空行は飛ばす）
pub fn read_labels<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut labels = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            labels.push(line);
        }
    }
    Ok(labels)
}

pub fn extract_all(labels: &[String], extractor: &SpanExtractor) -> Vec<LabelRecord> {
    labels.iter().map(|label| extractor.extract(label)).collect()
}

pub fn write_records<W: Write>(
    records: &[LabelRecord],
    format: OutputFormat,
    writer: W,
) -> Result<()> {
    match format {
        OutputFormat::Tsv => write_tsv(records, writer),
        OutputFormat::Json => {
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, records)?;
            writeln!(writer)?;
            Ok(())
        }
    }
}

fn write_tsv<W: Write>(records: &[LabelRecord], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    let mut headers = vec!["label".to_string()];
    headers.extend(Category::ALL.iter().map(|c| c.to_string()));
    headers.extend(["index", "supplement", "remainder"].map(String::from));
    writer.write_record(&headers)?;

    for record in records {
        let mut row = vec![record.raw.clone()];
        row.extend(
            Category::ALL
                .iter()
                .map(|c| record.span(*c).map(|v| v.to_string()).unwrap_or_default()),
        );
        row.push(flag(record.is_index));
        row.push(flag(record.is_supplement));
        row.push(record.remainder.clone());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn flag(value: bool) -> String {
    if value { "yes".into() } else { String::new() }
}
