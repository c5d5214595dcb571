/// CLI: обучение препроцессора на train и применение к train/test

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use student_ml::{DataTransformation, TransformationConfig};

#[derive(Debug, Parser)]
#[command(name = "student-ml", version, about = "Fit the student performance preprocessor")]
struct Cli {
    /// CSV с обучающей выборкой
    train: PathBuf,
    /// CSV с тестовой выборкой
    test: PathBuf,
    /// TOML-файл конфигурации
    #[arg(long)]
    config: Option<PathBuf>,
    /// Путь для сохранения препроцессора (перекрывает конфигурацию)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = TransformationConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(output) = cli.output {
        config = config.with_preprocessor_path(output);
    }

    let output = DataTransformation::new(config)
        .run_from_paths(&cli.train, &cli.test)
        .context("data transformation failed")?;

    let summary = serde_json::json!({
        "train_shape": output.train.shape(),
        "test_shape": output.test.shape(),
        "preprocessor_path": output.preprocessor_path,
        "feature_names": output.feature_names,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
