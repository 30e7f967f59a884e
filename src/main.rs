use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use roombook::config::Config;
use roombook::console::{parse_command, Command, Console, HELP};
use roombook::ReservationService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    roombook::observability::init(config.metrics_port);

    let service = Arc::new(ReservationService::new(config.normalizer()));
    if config.seed {
        service.seed_defaults().await?;
    }

    info!("roombook ready");
    info!("  timezone: {}", service.normalizer().tz());
    info!("  dst_policy: {}", service.normalizer().policy());
    info!("  rooms: {}", service.list_resources().await.len());
    info!(
        "  metrics: {}",
        config
            .metrics_port
            .map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics"))
    );

    // Stop on ctrl-c / SIGTERM as well as on `quit` or end of input.
    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {}
                        _ = sigterm.recv() => {}
                    }
                }
                Err(e) => {
                    tracing::warn!("failed to register SIGTERM handler: {e}");
                    ctrl_c.await.ok();
                }
            }
        }
        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
        }
    };
    tokio::pin!(shutdown);

    let mut console = Console::new(service);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    stdout.write_all(format!("{HELP}\n").as_bytes()).await?;

    loop {
        let prompt = format!("{}> ", console.login().unwrap_or("guest"));
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let reply = match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(cmd) => console.execute(cmd).await,
                    Err(e) => Err(e),
                };
                let text = match reply {
                    Ok(out) => out,
                    Err(e) => format!("error: {e}"),
                };
                stdout.write_all(format!("{text}\n").as_bytes()).await?;
            }
            _ = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    info!("roombook stopped");
    Ok(())
}
