#![forbid(unsafe_code)]

//! Command-line entry point: pulls channel, video and comment metadata from
//! the YouTube Data API and writes the three JSON documents locally and to
//! the object store.

use anyhow::{Result, bail};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use yt_harvest::comments::QuotaGate;
use yt_harvest::config::{ConfigOverrides, HarvestConfig, resolve_config};
use yt_harvest::pipeline;
use yt_harvest::sink::{ArtifactReport, ObjectStore, S3Store, SinkTarget, persist};
use yt_harvest::youtube::YouTubeClient;

#[derive(Debug, Parser)]
#[command(name = "harvest", version, about = "Harvest YouTube channel metadata")]
struct Cli {
    /// Channel ids to harvest; replaces the configured list.
    channel_ids: Vec<String>,

    /// YouTube Data API key (prefer API_KEY_YOUTUBE_API in the environment).
    #[arg(long)]
    api_key: Option<String>,

    /// Bucket receiving the uploaded documents.
    #[arg(long = "bucket")]
    bucket_name: Option<String>,

    /// Directory for the local JSON copies.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Seconds to pause after a quota error.
    #[arg(long)]
    quota_cooldown_secs: Option<u64>,

    #[arg(long, hide = true)]
    api_base_url: Option<String>,

    /// Only write local files.
    #[arg(long)]
    no_upload: bool,

    /// TOML settings file (defaults to ./harvest.toml when present).
    #[arg(long = "config")]
    config_path: Option<PathBuf>,

    /// dotenv file holding secrets (defaults to ./.env).
    #[arg(long = "env-file")]
    env_path: Option<PathBuf>,
}

impl Cli {
    fn into_overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            api_key: self.api_key,
            channel_ids: self.channel_ids,
            bucket_name: self.bucket_name,
            output_dir: self.output_dir,
            quota_cooldown_secs: self.quota_cooldown_secs,
            api_base_url: self.api_base_url,
            no_upload: self.no_upload,
            env_path: self.env_path,
            config_path: self.config_path,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let config = resolve_config(Cli::parse().into_overrides())?;
    tracing::debug!(?config, "resolved configuration");

    println!("===================================");
    println!("YouTube Metadata Harvest");
    println!("===================================");
    println!("Channels: {}", config.channel_ids.join(", "));
    println!("Output directory: {}", config.output_dir.display());
    if config.upload {
        println!("Bucket: {}", config.bucket_name);
    } else {
        println!("Uploads disabled");
    }
    println!();

    let client = YouTubeClient::with_base_url(&config.api_key, &config.api_base_url);
    let gate = QuotaGate::sleeping(config.quota_cooldown);
    let harvest = pipeline::run(&client, &gate, &config.channel_ids);

    let store = open_store(&config);
    let target = SinkTarget {
        output_dir: config.output_dir.clone(),
        bucket_name: config.bucket_name.clone(),
        upload: config.upload,
    };
    let reports = persist(
        &harvest,
        &target,
        store.as_ref().map(|store| store as &dyn ObjectStore),
    );

    println!();
    println!("===================================");
    println!("Harvest complete!");
    println!("===================================");
    for report in &reports {
        println!("{}", summary_line(report));
    }
    if gate.trips() > 0 {
        println!("Quota pauses: {}", gate.trips());
    }

    let failed = reports.iter().filter(|report| report.local_failed()).count();
    if failed > 0 {
        bail!("{failed} of {} local writes failed", reports.len());
    }
    Ok(())
}

/// Uploads are best effort: a store that cannot be built only disables them.
fn open_store(config: &HarvestConfig) -> Option<S3Store> {
    if !config.upload {
        return None;
    }
    match S3Store::from_env() {
        Ok(store) => Some(store),
        Err(err) => {
            tracing::error!(error = ?err, "object store unavailable, skipping uploads");
            None
        }
    }
}

fn summary_line(report: &ArtifactReport) -> String {
    let local = match &report.local {
        Ok(path) => path.display().to_string(),
        Err(_) => "local write FAILED".to_string(),
    };
    let upload = match &report.upload {
        None => "not uploaded",
        Some(Ok(())) => "uploaded",
        Some(Err(_)) => "upload FAILED",
    };
    format!("  - {} ({} records): {local}, {upload}", report.key, report.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use yt_harvest::sink::StoreError;

    #[test]
    fn positional_ids_and_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "harvest",
            "UC1",
            "UC2",
            "--api-key",
            "k",
            "--bucket",
            "b",
            "--output-dir",
            "/tmp/out",
            "--quota-cooldown-secs",
            "10",
            "--no-upload",
            "--config",
            "h.toml",
            "--env-file",
            "secrets.env",
        ])
        .unwrap();
        let overrides = cli.into_overrides();
        assert_eq!(overrides.api_key.as_deref(), Some("k"));
        assert_eq!(overrides.channel_ids, vec!["UC1", "UC2"]);
        assert_eq!(overrides.bucket_name.as_deref(), Some("b"));
        assert_eq!(overrides.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(overrides.quota_cooldown_secs, Some(10));
        assert!(overrides.no_upload);
        assert_eq!(overrides.config_path, Some(PathBuf::from("h.toml")));
        assert_eq!(overrides.env_path, Some(PathBuf::from("secrets.env")));
    }

    #[test]
    fn no_arguments_leaves_everything_to_configuration() {
        let overrides = Cli::try_parse_from(["harvest"]).unwrap().into_overrides();
        assert!(overrides.channel_ids.is_empty());
        assert!(overrides.bucket_name.is_none());
        assert!(!overrides.no_upload);
    }

    #[test]
    fn rejects_non_numeric_cooldown() {
        assert!(Cli::try_parse_from(["harvest", "--quota-cooldown-secs", "soon"]).is_err());
    }

    #[test]
    fn summary_line_reports_each_outcome() {
        let ok = ArtifactReport {
            key: "videos_info.json",
            records: 2,
            local: Ok(PathBuf::from("out/videos_info.json")),
            upload: Some(Ok(())),
        };
        assert_eq!(
            summary_line(&ok),
            "  - videos_info.json (2 records): out/videos_info.json, uploaded"
        );

        let failed = ArtifactReport {
            key: "channel_info.json",
            records: 0,
            local: Err(anyhow!("disk full")),
            upload: Some(Err(StoreError::Upload("denied".into()))),
        };
        let line = summary_line(&failed);
        assert!(line.contains("local write FAILED"));
        assert!(line.contains("upload FAILED"));
    }
}
