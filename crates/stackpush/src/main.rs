mod push;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stackpush")]
#[command(about = "レイヤード設定から CloudFormation スタックをデプロイ", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// テンプレートをデプロイして完了まで待機
    Push(PushArgs),
    /// バージョン情報を表示
    Version,
}

/// パイプラインから渡される値。各フラグは環境変数でも指定可能
#[derive(Args, Debug, Clone)]
pub struct PushArgs {
    /// プロジェクト名
    #[arg(short, long, env = "STACKPUSH_PROJECT")]
    pub project: String,

    /// 環境名 (dev, stg, prod)
    #[arg(short, long, env = "STACKPUSH_ENVIRONMENT")]
    pub environment: String,

    /// リージョン
    #[arg(short, long, env = "AWS_REGION")]
    pub region: String,

    /// テンプレートと <環境名>.properties を置くディレクトリ
    #[arg(long, env = "STACKPUSH_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// stackoutput.properties を読み書きするディレクトリ（デフォルト: カレントディレクトリ）
    #[arg(long, env = "STACKPUSH_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// ビルド番号
    #[arg(long, env = "BUILD_NUMBER")]
    pub build_number: Option<u64>,

    #[arg(long, env = "STACKPUSH_GROUP_ID")]
    pub group_id: Option<String>,

    #[arg(long, env = "STACKPUSH_ARTIFACT_ID")]
    pub artifact_id: Option<String>,

    #[arg(long = "artifact-version", env = "STACKPUSH_ARTIFACT_VERSION")]
    pub artifact_version: Option<String>,

    /// 追加のパイプライン変数 (KEY=VALUE、複数指定可)
    #[arg(long = "var", value_parser = parse_key_val)]
    pub vars: Vec<(String, String)>,

    /// 設定ファイル（指定しない場合は stackpush.yml を探索）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 変数ブローカーの Lambda 関数名
    #[arg(long, env = "STACKPUSH_VARIABLE_BROKER")]
    pub broker: Option<String>,

    /// ステータス確認の間隔（秒）
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// ステータス確認の最大回数
    #[arg(long)]
    pub max_polls: Option<u32>,

    /// テンプレート候補が複数ある場合にエラーにする
    #[arg(long)]
    pub strict_template: bool,
}

/// `KEY=VALUE` を分割
fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("KEY=VALUE 形式で指定してください: {}", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("キーが空です: {}", raw));
    }
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Push(args) => push::handle(args).await,
        Commands::Version => {
            println!("stackpush {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("buildNumber=42").unwrap(),
            ("buildNumber".to_string(), "42".to_string())
        );
        assert_eq!(
            parse_key_val("Url=https://example.com/?a=b").unwrap(),
            ("Url".to_string(), "https://example.com/?a=b".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=value").is_err());
    }

    #[test]
    fn test_cli_parses_push() {
        let cli = Cli::try_parse_from([
            "stackpush",
            "push",
            "--project",
            "web",
            "--environment",
            "dev",
            "--region",
            "us-east-1",
            "--var",
            "maven.version=1.0.0",
            "--max-polls",
            "30",
            "--strict-template",
        ])
        .unwrap();

        match cli.command {
            Commands::Push(args) => {
                assert_eq!(args.project, "web");
                assert_eq!(args.max_polls, Some(30));
                assert!(args.strict_template);
                assert_eq!(
                    args.vars,
                    vec![("maven.version".to_string(), "1.0.0".to_string())]
                );
            }
            Commands::Version => panic!("Expected push"),
        }
    }
}
