use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "enumcron-match")]
#[command(about = "巻号表示（enumcron）の解析・所蔵巻とカタログ巻の照合ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 警告以外のログと進捗表示を抑制
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// タブ区切りの所蔵データを照合し、一致率の列を追加する
    Match {
        /// 入力ファイル（ヘッダ付きタブ区切り）
        #[arg(required = true)]
        input: PathBuf,

        /// 出力ファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 照合戦略 (exact/1-span/2-span)
        #[arg(short, long)]
        strategy: Option<String>,

        /// 所蔵ラベルの列名
        #[arg(long)]
        volume_column: Option<String>,

        /// カタログラベルの列名
        #[arg(long)]
        enumcron_column: Option<String>,

        /// 追加の語彙ファイル（JSON）
        #[arg(long)]
        vocabulary: Option<PathBuf>,
    },

    /// ラベルごとの抽出結果を表示（1行1ラベル）
    Extract {
        /// 入力ファイル（省略時は標準入力）
        input: Option<PathBuf>,

        /// 出力形式 (tsv/json)
        #[arg(short, long, default_value = "tsv")]
        format: OutputFormat,

        /// 追加の語彙ファイル（JSON）
        #[arg(long)]
        vocabulary: Option<PathBuf>,
    },

    /// 1つの列の繰り返し値を1行ずつ表示
    Column {
        /// 入力ファイル（ヘッダ付きタブ区切り）
        #[arg(required = true)]
        input: PathBuf,

        /// 列名
        #[arg(required = true)]
        column: String,
    },

    /// 照合戦略の一覧
    Strategies,

    /// 設定を表示/編集
    Config {
        /// 既定の照合戦略を設定
        #[arg(long)]
        set_strategy: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 設定ファイルのパスを表示
        #[arg(long)]
        path: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Tsv,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" | "tab" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use tsv or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Tsv => write!(f, "tsv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
