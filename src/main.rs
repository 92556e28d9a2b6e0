use clap::Parser;
use textline_detect::config::{Cli, Command, Config, DetectArgs, DetectionConfig};
use textline_detect::{engines, lines_to_json, render, server, Detector, ModelCache};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Serve(args) => {
            let config = Config::try_from(args)?;

            tracing::info!("Starting textline-detect v{}", env!("CARGO_PKG_VERSION"));
            tracing::info!("Binding to {}:{}", config.host, config.port);

            server::run(config).await
        }
        Command::Detect(args) => tokio::task::spawn_blocking(move || detect_once(args)).await?,
    }
}

/// Run the pipeline on a single image and print the lines as JSON
fn detect_once(args: DetectArgs) -> anyhow::Result<()> {
    let config = DetectionConfig::default().with_overrides(&args.detection)?;
    let model_path = args.model_path.clone();
    let detector = Detector::new(
        ModelCache::new(move || engines::load_backend(&model_path)),
        config,
    )?;

    let image = image::open(&args.image)?;
    let lines = detector.detect(&image)?;
    println!("{}", lines_to_json(&lines)?);

    if let Some(path) = &args.overlay {
        render::draw_lines(&image, &lines).save(path)?;
        tracing::info!("Overlay written to {}", path.display());
    }

    Ok(())
}
