use anyhow::Context;
use clap::Parser;
use enumcron_common::strategy_names;
use enumcron_match::{cli, config, extract, pipeline, table};
use cli::{Cli, Commands};
use config::Config;
use pipeline::{JobOverrides, MatchJob};
use std::io::{BufReader, IsTerminal, Write};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let config = Config::load()?;

    match cli.command {
        Commands::Match { input, output, strategy, volume_column, enumcron_column, vocabulary } => {
            let overrides = JobOverrides {
                strategy: strategy.as_deref(),
                volume_column: volume_column.as_deref(),
                enumcron_column: enumcron_column.as_deref(),
                vocabulary: vocabulary.as_deref(),
            };
            let job = MatchJob::new(&config, &overrides)?;

            let input_table = table::Table::read_path(&input)
                .with_context(|| format!("入力を読み込めません: {}", input.display()))?;
            tracing::info!(
                rows = input_table.rows.len(),
                strategy = job.strategy_name(),
                "照合を開始"
            );

            let progress = !cli.quiet && std::io::stderr().is_terminal();
            let (output_table, summary) = job.run(&input_table, progress)?;

            match output {
                Some(path) => {
                    output_table.write_path(&path)?;
                    tracing::info!(path = %path.display(), "結果を保存");
                }
                None => output_table.write_to(std::io::stdout().lock())?,
            }

            if summary.judged < summary.rows {
                tracing::info!(
                    "{}行は所蔵ラベルが空のため判定していません",
                    summary.rows - summary.judged
                );
            }
        }

        Commands::Extract { input, format, vocabulary } => {
            let extractor = config.extractor(vocabulary.as_deref())?;
            let labels = match input {
                Some(path) => {
                    let file = std::fs::File::open(&path)
                        .with_context(|| format!("入力を開けません: {}", path.display()))?;
                    extract::read_labels(BufReader::new(file))?
                }
                None => extract::read_labels(std::io::stdin().lock())?,
            };

            let records = extract::extract_all(&labels, &extractor);
            extract::write_records(&records, format, std::io::stdout().lock())?;
        }

        Commands::Column { input, column } => {
            let input_table = table::Table::read_path(&input)
                .with_context(|| format!("入力を読み込めません: {}", input.display()))?;
            let mut stdout = std::io::stdout().lock();
            for value in table::column_values(&input_table, &column)? {
                writeln!(stdout, "{value}")?;
            }
        }

        Commands::Strategies => {
            for name in strategy_names() {
                let marker = if name == config.default_strategy { " (default)" } else { "" };
                println!("{name}{marker}");
            }
        }

        Commands::Config { set_strategy, show, path } => {
            let mut config = config;

            if let Some(name) = set_strategy {
                config.set_strategy(&name)?;
                config.save()?;
                println!("✔ 既定の照合戦略を {} に設定しました", config.default_strategy);
            }

            if path {
                println!("{}", Config::config_path()?.display());
            }

            if show {
                println!("設定:");
                println!("  照合戦略: {}", config.default_strategy);
                println!("  所蔵ラベル列: {}", config.volume_column);
                println!("  カタログラベル列: {}", config.enumcron_column);
                println!("  年の範囲: {}..={}", config.min_year, config.max_year);
                println!(
                    "  数字のみのラベルを巻とみなす: {}",
                    if config.bare_number_as_volume { "はい" } else { "いいえ" }
                );
                println!(
                    "  語彙ファイル: {}",
                    config
                        .vocabulary_file
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
            }
        }
    }

    Ok(())
}
