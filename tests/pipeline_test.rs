//! ファイル入出力を含む照合パイプラインのテスト

use enumcron_match::config::Config;
use enumcron_match::pipeline::{JobOverrides, MatchJob};
use enumcron_match::table::{Table, MATCHES_COLUMN, PERCENT_COLUMN};
use tempfile::tempdir;

const INPUT: &str = "\
OCLC\tVOLUME\tenumcrons
101\t\"v.1\";\"v.2\";\"v.3\"\t\"v. 1\";\"v. 2\";\"v. 3\";\"v. 4\"
102\tV1; V.1 NO.1\tVol.1
103\t\tv.1
104\tv.7\t
";

fn run(strategy: &str) -> Table {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("holdings.tsv");
    let output = dir.path().join("out").join("matched.tsv");
    std::fs::write(&input, INPUT).unwrap();

    let overrides = JobOverrides {
        strategy: Some(strategy),
        ..JobOverrides::default()
    };
    let job = MatchJob::new(&Config::default(), &overrides).unwrap();
    let table = Table::read_path(&input).unwrap();
    let (result, _) = job.run(&table, false).unwrap();
    result.write_path(&output).unwrap();

    assert!(output.exists());
    Table::read_path(&output).unwrap()
}

#[test]
fn test_output_keeps_rows_and_adds_columns() {
    let table = run("exact");
    assert_eq!(
        table.headers,
        vec!["OCLC", "VOLUME", "enumcrons", PERCENT_COLUMN, MATCHES_COLUMN]
    );
    assert_eq!(table.rows.len(), 4);
    let ids: Vec<&str> = table.rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(ids, vec!["101", "102", "103", "104"]);
    // 元のセルはそのまま
    assert_eq!(table.rows[0][1], r#""v.1";"v.2";"v.3""#);
}

#[test]
fn test_one_span_rows() {
    let table = run("1-span");
    assert_eq!(table.rows[0][3], "100.0");
    assert_eq!(
        table.rows[0][4],
        "v.1 => v. 1; v.2 => v. 2; v.3 => v. 3"
    );
}

#[test]
fn test_exact_rows() {
    let table = run("exact");
    assert_eq!(table.rows[1][3], "50.0");
    assert_eq!(table.rows[1][4], "V1 => Vol.1; V.1 NO.1 => (no match)");
}

#[test]
fn test_rows_without_labels() {
    let table = run("2-span");
    // 所蔵ラベルなし: 判定しない
    assert_eq!(table.rows[2][3], "");
    assert_eq!(table.rows[2][4], "");
    // カタログラベルなし: 0%
    assert_eq!(table.rows[3][3], "0.0");
    assert_eq!(table.rows[3][4], "v.7 => (no match)");
}

#[test]
fn test_column_overrides() {
    let input = "ID\tHOLDINGS\tCATALOG\n1\tv.2\tv.2\n";
    let table = Table::read_from(input.as_bytes()).unwrap();
    let overrides = JobOverrides {
        volume_column: Some("HOLDINGS"),
        enumcron_column: Some("CATALOG"),
        ..JobOverrides::default()
    };
    let job = MatchJob::new(&Config::default(), &overrides).unwrap();
    assert_eq!(job.strategy_name(), "1-span");

    let (result, summary) = job.run(&table, false).unwrap();
    assert_eq!(result.rows[0][3], "100.0");
    assert_eq!(summary.fully_matched, 1);
}
