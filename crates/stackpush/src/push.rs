use crate::PushArgs;
use anyhow::Context;
use colored::Colorize;
use stackpush_cloud_aws::{CloudFormationProvider, LambdaBroker, load_sdk_config};
use stackpush_config::{ArtifactCoordinates, PipelineContext, PushSettings, TemplateSelection};
use stackpush_core::{DeployOutcome, PushReport, StackPush};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

pub async fn handle(args: PushArgs) -> anyhow::Result<()> {
    let root = args
        .root
        .canonicalize()
        .with_context(|| format!("ディレクトリが見つかりません: {}", args.root.display()))?;

    let settings = load_settings(&args, &root)?;
    let context = pipeline_context(&args, &root);

    println!("{}", "スタックのデプロイを開始します...".blue().bold());
    println!("プロジェクト: {}", context.project_name.cyan());
    println!("環境: {}", context.environment_name.cyan());
    println!("リージョン: {}", args.region.cyan());

    let sdk_config = load_sdk_config(args.region.as_str()).await;
    let provider = Arc::new(CloudFormationProvider::new(&sdk_config));

    let work_dir = match &args.work_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("カレントディレクトリを取得できません")?,
    };
    let mut push = StackPush::new(provider, args.region.as_str(), settings.clone())
        .with_work_dir(work_dir);
    if let Some(function) = &settings.variable_broker {
        println!("変数ブローカー: {}", function.cyan());
        push = push.with_broker(Arc::new(LambdaBroker::new(&sdk_config, function.as_str())));
    }

    let cancel = push.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", "中断します...".yellow());
            cancel.cancel();
        }
    });

    info!(
        project = %context.project_name,
        environment = %context.environment_name,
        region = %args.region,
        "Starting push"
    );
    let report = match push.push(&context).await {
        Ok(report) => report,
        Err(e) => {
            error!("Push failed: {}", e);
            return Err(e.into());
        }
    };
    print_report(&report);
    Ok(())
}

/// 設定ファイルを読み込み、CLI フラグで上書き
fn load_settings(args: &PushArgs, root: &Path) -> anyhow::Result<PushSettings> {
    let mut settings = match &args.config {
        Some(path) => PushSettings::load(path)?,
        None => PushSettings::discover(root)?,
    };

    if let Some(broker) = &args.broker {
        settings.variable_broker = Some(broker.clone());
    }
    if let Some(interval) = args.poll_interval {
        settings.poll_interval_secs = interval;
    }
    if let Some(max_polls) = args.max_polls {
        settings.max_polls = Some(max_polls);
    }
    if args.strict_template {
        settings.template_selection = TemplateSelection::Strict;
    }

    settings.validate()?;
    Ok(settings)
}

fn pipeline_context(args: &PushArgs, root: &Path) -> PipelineContext {
    let mut context = PipelineContext::new(&args.project, &args.environment, root).with_artifact(
        ArtifactCoordinates {
            group_id: args.group_id.clone(),
            artifact_id: args.artifact_id.clone(),
            version: args.artifact_version.clone(),
        },
    );
    if let Some(build_number) = args.build_number {
        context = context.with_build_number(build_number);
    }
    for (key, value) in &args.vars {
        context = context.with_variable(key, value);
    }
    context
}

fn print_report(report: &PushReport) {
    println!();
    let outcome = match report.outcome {
        DeployOutcome::Created => "作成".green(),
        DeployOutcome::Updated => "更新".green(),
        DeployOutcome::NoChanges => "変更なし".yellow(),
    };
    println!(
        "{} {} ({})",
        "✓".green().bold(),
        report.stack_name.cyan().bold(),
        outcome
    );

    if !report.outputs.outputs.is_empty() {
        println!();
        println!("{}", "出力:".bold());
        for (key, value) in report.outputs.outputs.iter() {
            println!("  {} = {}", key, value.dimmed());
        }
        println!("  → {}", report.output_file.display());
    }

    if !report.outputs.task_definitions.is_empty() {
        println!();
        println!("{}", "タスク定義:".bold());
        for task_definition in &report.outputs.task_definitions {
            println!("  • {}", task_definition.cyan());
        }
    }
}
