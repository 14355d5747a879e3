use std::path::PathBuf;

use anyhow::{bail, Context};
use log::info;
use notice_parser::calc::premium::PremiumCalculator;
use notice_parser::config::Config;
use notice_parser::utils::document_processor::DocumentProcessor;
use serde_json::json;

const USAGE: &str = "usage: notice-parser [--config FILE] [--calc] PATH...";

fn main() -> anyhow::Result<()> {
    // Logger may already be set by an embedding test harness.
    let _ = env_logger::try_init();

    let mut config_path: Option<PathBuf> = None;
    let mut with_calc = false;
    let mut inputs: Vec<PathBuf> = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => match args.next() {
                Some(path) => config_path = Some(PathBuf::from(path)),
                None => bail!("--config needs a file\n{}", USAGE),
            },
            "--calc" => with_calc = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            _ => inputs.push(PathBuf::from(arg)),
        }
    }
    if inputs.is_empty() {
        bail!(USAGE);
    }

    let config = Config::resolve(config_path.as_deref()).context("failed to load configuration")?;
    let processor = DocumentProcessor::from_config(&config).context("invalid synonym table")?;
    let report = processor.process_paths(&inputs)?;
    let calculator = PremiumCalculator::new(&config.rates, processor.builder().synonyms());

    for outcome in &report.outcomes {
        let line = match &outcome.result {
            Ok(record) => {
                let premiums = if with_calc { calculator.calculate(record) } else { None };
                json!({
                    "path": outcome.path,
                    "filename": outcome.filename,
                    "digest": outcome.digest,
                    "record": record,
                    "premiums": premiums,
                })
            }
            Err(e) => json!({
                "path": outcome.path,
                "filename": outcome.filename,
                "digest": outcome.digest,
                "error": e.to_string(),
            }),
        };
        println!("{}", line);
    }

    info!(
        "{} documents: {} parsed, {} failed",
        report.outcomes.len(),
        report.succeeded(),
        report.failed()
    );
    Ok(())
}
