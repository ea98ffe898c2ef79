//! Дашборд + однократный запуск пайплайна обучения

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use cars_mpg_ml::{
    dashboard, run_pipeline,
    visor::{Dashboard, FanoutVisor, RunStatus, TracingVisor, Visor},
    AppConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config_path = std::env::var_os("CARS_MPG_CONFIG").map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref()).context("failed to load configuration")?;

    let board = Dashboard::new();
    let visor: Arc<dyn Visor> = Arc::new(FanoutVisor::new(vec![
        Arc::new(TracingVisor) as Arc<dyn Visor>,
        Arc::new(board.clone()),
    ]));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("Dashboard listening on http://{}", config.bind_addr);

    // Пайплайн запускается один раз, когда сервер готов
    let pipeline_board = board.clone();
    tokio::spawn(async move {
        pipeline_board.set_status(RunStatus::Loading);
        match run_pipeline(&config, visor).await {
            Ok(report) => {
                tracing::info!(
                    "Pipeline finished: {} records, final loss {:?}",
                    report.records,
                    report.history.final_loss()
                );
                pipeline_board.finish(report);
            }
            Err(e) => {
                tracing::error!("Pipeline failed: {}", e);
                pipeline_board.fail(&e.to_string());
            }
        }
    });

    axum::serve(listener, dashboard::router(board))
        .await
        .context("dashboard server failed")?;
    Ok(())
}
