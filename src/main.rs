use std::{process, sync::Arc};

use objcache::{
    backend::{BackendSelector, CacheBackend},
    cache::CacheConfig,
    config::{self, ReplayArgs, Settings},
    error::AppError,
    infra::telemetry,
    replay::{ReplayScript, replay},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    let backend = select_backend(&settings);
    match cli_args.command.unwrap_or(config::Command::Probe) {
        config::Command::Probe => {
            println!("{}", backend.name());
            Ok(())
        }
        config::Command::Replay(args) => run_replay(&settings, backend, args).await,
    }
}

fn select_backend(settings: &Settings) -> Arc<dyn CacheBackend> {
    BackendSelector::from_settings(&settings.backend).select()
}

async fn run_replay(
    settings: &Settings,
    backend: Arc<dyn CacheBackend>,
    args: ReplayArgs,
) -> Result<(), AppError> {
    let script = ReplayScript::load(&args.file).await?;
    info!(file = %args.file.display(), "Replaying host notifications");

    let report = replay(CacheConfig::from(settings), backend, script, args.admin).await;

    for (index, step) in report.steps.iter().enumerate() {
        println!("{:>3} {:<24} {}", index + 1, step.hook.as_str(), step.outcome);
    }

    let flushed: Vec<_> = report
        .summary
        .flushed
        .iter()
        .map(|class| class.as_str())
        .collect();
    println!(
        "request {} ({}): {} flush call(s), classes [{}]",
        report.summary.request_id,
        report.summary.mode,
        report.flush_calls(),
        flushed.join(", ")
    );
    Ok(())
}
