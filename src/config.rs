use crate::error::{AppError, Result};
use enumcron_common::{strategy_by_name, ExtractorOptions, SpanExtractor, Vocabulary};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_strategy: String,
    pub volume_column: String,
    pub enumcron_column: String,
    pub min_year: i32,
    pub max_year: i32,
    /// 数字だけのラベルを巻として扱う
    pub bare_number_as_volume: bool,
    /// 組み込み語彙に重ねる語彙JSON
    pub vocabulary_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let options = ExtractorOptions::default();
        Self {
            default_strategy: "1-span".into(),
            volume_column: "VOLUME".into(),
            enumcron_column: "enumcrons".into(),
            min_year: options.min_year,
            max_year: options.max_year,
            bare_number_as_volume: options.bare_number_as_volume,
            vocabulary_file: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスから読み込む（ファイルがなければデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AppError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("enumcron-match").join("config.json"))
    }

    /// 既定の照合戦略を変更（名前は保存前に検証する）
    pub fn set_strategy(&mut self, name: &str) -> Result<()> {
        let strategy = strategy_by_name(name)?;
        self.default_strategy = strategy.name().to_string();
        Ok(())
    }

    /// 組み込み語彙と `vocabulary_file` を重ねた語彙
    pub fn vocabulary(&self, override_file: Option<&Path>) -> Result<Vocabulary> {
        let mut vocabulary = Vocabulary::standard();

        if let Some(path) = override_file.or(self.vocabulary_file.as_deref()) {
            if !path.exists() {
                return Err(AppError::FileNotFound(path.display().to_string()));
            }
            vocabulary.merge(&Vocabulary::from_file(path)?);
            tracing::debug!(path = %path.display(), "vocabulary file merged");
        }

        vocabulary.validate()?;
        Ok(vocabulary)
    }

    pub fn extractor_options(&self) -> ExtractorOptions {
        ExtractorOptions {
            min_year: self.min_year,
            max_year: self.max_year,
            bare_number_as_volume: self.bare_number_as_volume,
        }
    }

    pub fn extractor(&self, override_file: Option<&Path>) -> Result<SpanExtractor> {
        let vocabulary = self.vocabulary(override_file)?;
        Ok(SpanExtractor::new(&vocabulary, self.extractor_options())?)
    }
}
