use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO エラー: {path}\n理由: {message}")]
    Io { path: PathBuf, message: String },

    #[error("プロパティファイルの形式が不正です ({line} 行目): {message}")]
    InvalidProperties { line: usize, message: String },

    #[error("設定ファイルのパースに失敗しました: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("無効な設定: {0}")]
    InvalidSettings(String),

    #[error("設定ファイルが見つかりません: {0}")]
    SettingsFileNotFound(PathBuf),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
