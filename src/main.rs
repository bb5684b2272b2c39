use anyhow::Result;
use cpuwatch::alert::LogAlertSink;
use cpuwatch::sampler::Sampler;
use cpuwatch::*;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let (app_config, config_error) = config::AppConfig::load_or_default();
    let _log_guard = logging::init(app_config.log_file())?;
    if let Some(e) = config_error {
        tracing::error!(error = %format!("{e:#}"), "Invalid configuration");
        return Ok(ExitCode::FAILURE);
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        threshold = app_config.monitor.cpu_threshold_percent,
        poll_interval_secs = app_config.monitor.poll_interval_secs,
        "Starting container CPU monitor..."
    );

    let docker_repo = match docker_repo::DockerRepo::connect() {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "Docker connection failed");
            return Ok(ExitCode::FAILURE);
        }
    };

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(cancel.clone()));

    let mut sampler = Sampler::new(docker_repo, LogAlertSink, app_config.sampler_config());
    // the sampler logs the enumeration failure itself
    if sampler.run(cancel).await.is_err() {
        return Ok(ExitCode::FAILURE);
    }

    tracing::info!("Exiting gracefully");
    Ok(ExitCode::SUCCESS)
}

/// Cancel `token` on Ctrl-C or SIGTERM.
async fn shutdown_on_signal(token: CancellationToken) {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(error = %e, "SIGTERM handler unavailable; Ctrl-C only");
                    let _ = tokio::signal::ctrl_c().await;
                    tracing::info!("Received exit signal");
                    token.cancel();
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Received exit signal");
    token.cancel();
}
