use color_eyre::eyre::eyre;
use media_stamper::staging::processed_path;
use media_stamper::{MediaStamper, StampRequest};
use std::path::{Path, PathBuf};

/// Stamps the photo or video given as the first argument into `processed/`.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let path: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| eyre!("usage: basic_use <photo-or-video>"))?;
    let stamper = MediaStamper::builder().build()?;
    let request = StampRequest::builder()
        .source(&path)
        .destination(processed_path(Path::new("processed"), &path))
        .build();
    std::fs::create_dir_all("processed")?;

    let report = stamper.stamp(&request).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
