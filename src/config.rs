use crate::error::{CropReportError, Result};
use crop_report_common::HTML2PDF_CDN_URL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// page1.html 〜 page6.html の置き場所
    pub templates_dir: PathBuf,
    /// 抽出画像の置き場所（直下は既定画像、圃場ごとにサブディレクトリ）
    pub images_dir: PathBuf,
    /// レポート出力先
    pub output_dir: PathBuf,
    /// ロゴや圃場写真などの静的ファイル
    pub assets_dir: String,
    /// html2pdf.js の読み込み元
    pub pdf_script_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CropReportError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("crop-report").join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            images_dir: PathBuf::from("images"),
            output_dir: PathBuf::from("reports"),
            assets_dir: "assest".into(),
            pdf_script_url: HTML2PDF_CDN_URL.into(),
        }
    }

    pub fn set_templates_dir(&mut self, dir: PathBuf) -> Result<()> {
        self.templates_dir = dir;
        self.save()
    }

    pub fn set_output_dir(&mut self, dir: PathBuf) -> Result<()> {
        self.output_dir = dir;
        self.save()
    }

    pub fn set_images_dir(&mut self, dir: PathBuf) -> Result<()> {
        self.images_dir = dir;
        self.save()
    }
}
