use std::path::Path;

use burns_media::{check_ffmpeg, check_ffprobe};
use burns_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::from_env();

    println!(
        "burns-selfcheck: starting with static_dir={}",
        config.static_dir.display()
    );
    ensure_static_dir(&config.static_dir).await?;
    ensure_encoder()?;
    ensure_metrics_dir(config.metrics_path.as_deref())?;

    println!("burns-selfcheck: ok");
    Ok(())
}

async fn ensure_static_dir(path: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

fn ensure_encoder() -> anyhow::Result<()> {
    let ffmpeg = check_ffmpeg().map_err(|e| anyhow::anyhow!("ffmpeg not available: {}", e))?;
    let ffprobe = check_ffprobe().map_err(|e| anyhow::anyhow!("ffprobe not available: {}", e))?;

    let output = std::process::Command::new(&ffmpeg)
        .arg("-version")
        .output()
        .map_err(|e| anyhow::anyhow!("ffmpeg not runnable: {}", e))?;
    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "ffmpeg -version failed: {:?}",
            output.status
        ));
    }

    println!(
        "burns-selfcheck: ffmpeg={} ffprobe={}",
        ffmpeg.display(),
        ffprobe.display()
    );
    Ok(())
}

fn ensure_metrics_dir(path: Option<&Path>) -> anyhow::Result<()> {
    let Some(parent) = path.and_then(Path::parent).filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if !parent.is_dir() {
        return Err(anyhow::anyhow!(
            "metrics directory {} does not exist",
            parent.display()
        ));
    }
    Ok(())
}
