use anyhow::{bail, Context};
use detector_hub::models::DetectRequest;
use detector_hub::services::{ConfigCommand, ConfigStore};
use std::io::Read;

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn parse_detectors(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_input(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("read stdin failed")?;
        return Ok(text);
    }
    std::fs::read_to_string(source).with_context(|| format!("read file failed: {}", source))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  detect_text <path|-> [--detectors <name,name>] [--out <json_path>]\n  detect_text --list\n  detect_text --set-key <provider> <key>\n  detect_text --delete-key <provider>\n  detect_text --set-url <provider> <url>\n\nNotes:\n  - Without --detectors every detector with a configured API key is used.\n  - API keys come from GPTZERO_API_KEY, ORIGINALITY_API_KEY, COPYLEAKS_API_KEY (email:api_key)\n    or the detector-hub config file.\n  - Providers: gptzero, originality, copyleaks. Config edits keep timestamped backups."
        );
        return Ok(());
    }

    detector_hub::init_logging();

    if let Some(command) = ConfigCommand::from_args(&args).map_err(anyhow::Error::msg)? {
        let dir = ConfigStore::default_config_dir().context("no config directory on this platform")?;
        let message = ConfigStore::new(dir).apply(&command).map_err(anyhow::Error::msg)?;
        eprintln!("{}", message);
        return Ok(());
    }

    let state = detector_hub::bootstrap().map_err(anyhow::Error::msg)?;

    if has_flag(&args, "--list") {
        println!("{}", serde_json::to_string_pretty(&state.list_detectors())?);
        return Ok(());
    }

    let source = &args[1];
    if source.starts_with("--") {
        bail!("expected an input path or '-' before {}", source);
    }

    let text = read_input(source)?;
    let detectors = parse_arg_value(&args, "--detectors").map(|raw| parse_detectors(&raw));
    let out_path = parse_arg_value(&args, "--out");

    let response = state
        .detect_text(DetectRequest { text, detectors })
        .await
        .map_err(|e| anyhow::anyhow!("request rejected ({}): {}", e.status_code(), e))?;

    let json = serde_json::to_string_pretty(&response)?;
    println!("{}", json);

    for result in &response.results {
        match (result.label, result.score) {
            (Some(label), Some(score)) => {
                eprintln!("  {:<12} {:<5} {:.4}", result.detector, label, score)
            }
            _ => eprintln!(
                "  {:<12} error: {}",
                result.detector,
                result.error.as_deref().unwrap_or("unknown")
            ),
        }
    }

    if let Some(out_path) = out_path {
        std::fs::write(&out_path, &json).with_context(|| format!("write {} failed", out_path))?;
        eprintln!("Wrote response to {}", out_path);
    }

    Ok(())
}
