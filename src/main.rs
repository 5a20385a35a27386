use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
mod config;
mod detector;
mod error;
mod events;
mod mappings;
mod services;
mod utils;

use config::Config;
use services::{Lifecycle, PressMonitor};

#[derive(Parser, Debug)]
#[command(name = "power-press")]
#[command(about = "Распознаёт двойное и тройное нажатие кнопки питания и отправляет сигнал D-Bus")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "power-press.toml")]
    config: String,

    /// Режим сухого запуска (эмуляция нажатий, сигналы только в лог)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (перекрывает значение из конфигурации)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Arc::new(Config::load(&args.config)?);

    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск power-press v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    if args.dry_run {
        warn!("Режим сухого запуска - устройство и D-Bus не используются");
    } else if let Err(e) = utils::permissions::check_permissions(&config.input) {
        error!("{}", e);
        for line in utils::permissions::get_setup_commands() {
            error!("{}", line);
        }
        return Err(e.into());
    }

    let monitor = PressMonitor::new(config.clone(), args.dry_run);
    monitor.start().await?;

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Получен сигнал завершения (Ctrl+C)");
        }
        Err(err) => {
            error!("Ошибка при ожидании сигнала завершения: {}", err);
        }
    }

    info!("Завершение работы...");
    monitor.stop().await?;

    info!("power-press завершил работу");
    Ok(())
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        "full" => registry.with(tracing_subscriber::fmt::layer()).init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init(),
    }

    Ok(())
}
