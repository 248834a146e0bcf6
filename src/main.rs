use anyhow::Context;
use candle_studio::backend::GeminiClient;
use candle_studio::orchestrator::{self, GenerationOptions, RunReport};
use candle_studio::output::{self, ProcessedImage};
use candle_studio::{cli, config, proxy, scanner};
use candle_studio_common::{BackgroundStyle, SelectionError, Studio};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;

    match cli.command {
        Commands::Generate { paths, style, output, proxy_url } => {
            println!("🕯  candle-studio - generowanie\n");

            // 1. 画像の読み込み
            println!("[1/3] Wczytywanie zdjęć...");
            let images = scanner::collect_images(&paths)?;
            if images.is_empty() {
                return Err(SelectionError::Empty.into());
            }
            let originals = images
                .iter()
                .map(scanner::load_data_url)
                .collect::<Result<Vec<_>, _>>()?;
            println!("✔ Wczytano zdjęć: {}\n", images.len());

            let style = style.unwrap_or(config.default_style);
            let mut studio = Studio::with_style(style);
            let ids = studio.add_images(originals)?;

            // 2. 出品文 + 背景編集
            println!("[2/3] Generowanie (styl: {})...", style);
            let client = match proxy_url {
                Some(url) => GeminiClient::proxy(url),
                None => GeminiClient::from_config(&config)?,
            };
            let options = GenerationOptions::from_config(&config);

            let spinner = spinner(images.len());
            let result = orchestrator::run(&client, &mut studio, &options).await;
            spinner.finish_and_clear();
            let report = result?;
            println!("✔ Gotowe\n");

            // 3. 保存
            println!("[3/3] Zapisywanie wyników...");
            let output_dir = output.unwrap_or_else(default_output_dir);
            let stems: Vec<String> = images.iter().map(|i| i.stem()).collect();
            let processed: Vec<ProcessedImage<'_>> = ids
                .iter()
                .zip(&stems)
                .enumerate()
                .filter_map(|(index, (id, stem))| {
                    let data_url = studio.image(id)?.processed_data.as_deref()?;
                    Some(ProcessedImage { index, stem: stem.as_str(), data_url })
                })
                .collect();
            let written = output::write_run(&output_dir, &report.listing, report.style, &processed)
                .with_context(|| format!("Nie udało się zapisać wyników w {}", output_dir.display()))?;
            println!("✔ Zapisano: {}\n", output_dir.display());

            print_report(&report, &ids, &stems);
            for path in &written.images {
                println!("  🖼  {}", path.display());
            }

            println!("\n✅ Zakończono");
        }

        Commands::Serve { bind } => {
            let state = proxy::ProxyState::from_config(&config);
            proxy::serve(bind, state).await?;
        }

        Commands::Styles => {
            for style in BackgroundStyle::ALL {
                let marker = if style == config.default_style { " (domyślny)" } else { "" };
                println!("  {:<12} {}{}", style.slug(), style.label(), marker);
            }
        }

        Commands::Config { set_api_key, set_proxy_url, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ Zapisano klucz API");
            }

            if let Some(url) = set_proxy_url {
                config.set_proxy_url(url)?;
                println!("✔ Zapisano adres proxy");
            }

            if show {
                println!("Ustawienia:");
                println!("  Model opisu: {}", config.listing_model);
                println!("  Model obrazów: {}", config.image_model);
                println!("  Limit czasu: {}s", config.request_timeout().as_secs());
                println!("  Domyślny styl: {}", config.default_style);
                println!(
                    "  Proxy: {}",
                    config.get_proxy_url().unwrap_or_else(|| "brak".to_string())
                );
                println!(
                    "  Klucz API: {}",
                    if config.get_api_key().is_ok() { "ustawiony" } else { "brak" }
                );
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn spinner(images: usize) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("opis + {} zdjęć", images));
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(format!(
        "candle-studio-{}",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ))
}

fn print_report(report: &RunReport, ids: &[String], stems: &[String]) {
    println!("Tytuł: {}", report.listing.title);
    println!("\n{}\n", report.listing.description);
    println!("{}\n", report.listing.hashtag_line());

    println!("Zdjęcia ({}):", report.style);
    for id in &report.processed {
        println!("  ✔ {}", display_name(id, ids, stems));
    }
    for (id, message) in &report.failed {
        println!("  ✗ {}: {}", display_name(id, ids, stems), message);
    }
}

/// 画像IDを元ファイル名に戻す
fn display_name<'a>(id: &'a str, ids: &[String], stems: &'a [String]) -> &'a str {
    ids.iter()
        .position(|i| i == id)
        .and_then(|index| stems.get(index))
        .map(String::as_str)
        .unwrap_or(id)
}
