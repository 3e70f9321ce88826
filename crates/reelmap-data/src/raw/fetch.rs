use super::Result;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::fs;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};
use zip::ZipArchive;

/// Download a dataset to a temporary file.
///
/// URLs ending in `.zip` are treated as archives whose first entry is the
/// dataset.
#[instrument(name = "Download dataset", level = "info")]
pub fn download_dataset(url: &str) -> Result<NamedTempFile> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let client = Client::new();
        if url.to_ascii_lowercase().ends_with(".zip") {
            download_zip_and_extract_first_entry_to_temp_file(&client, url).await
        } else {
            download_to_temp_file(&client, url).await
        }
    })
}

const PROGRESS_TEMPLATE: &str =
    "{msg} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})";

fn progress_bar(len: u64, url: &str) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    let name = url.rsplit('/').next().unwrap_or(url);
    ProgressBar::new(len)
        .with_style(style)
        .with_message(format!("Fetching {name}"))
}

/// Stream `url` into a temporary file.
async fn download_to_temp_file(client: &Client, url: &str) -> Result<NamedTempFile> {
    info!(url, "Starting download");
    let response = client.get(url).send().await?.error_for_status()?;
    let pb = progress_bar(response.content_length().unwrap_or(0), url);

    let temp_file = NamedTempFile::new()?;
    let mut out = tokio::fs::File::create(temp_file.path()).await?;
    let mut body = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        out.write_all(&chunk).await?;
        written += chunk.len() as u64;
        pb.set_position(written);
    }
    out.flush().await?;
    pb.finish_and_clear();

    info!(url, bytes = written, "Download complete");
    Ok(temp_file)
}

async fn download_zip_and_extract_first_entry_to_temp_file(
    client: &Client,
    zip_url: &str,
) -> Result<NamedTempFile> {
    let archive = download_to_temp_file(client, zip_url).await?;
    // Extraction is blocking IO. The archive temp file must outlive it.
    let archive_path = archive.path().to_path_buf();
    let extracted =
        tokio::task::spawn_blocking(move || extract_first_entry_from_zip(&archive_path)).await??;
    drop(archive);
    Ok(extracted)
}

fn extract_first_entry_from_zip(archive_path: &Path) -> Result<NamedTempFile> {
    let mut archive = ZipArchive::new(fs::File::open(&archive_path)?)?;

    if archive.is_empty() {
        return Err(zip::result::ZipError::FileNotFound.into());
    }

    let mut entry = archive.by_index(0)?;
    let entry_name = entry.name().to_owned();

    let mut extracted = NamedTempFile::with_suffix(".list")?;
    let bytes = std::io::copy(&mut entry, extracted.as_file_mut())?;
    info!(entry = %entry_name, bytes, "Dataset extracted from archive");

    Ok(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    #[test]
    fn test_extract_first_entry_from_zip() {
        let archive_file = NamedTempFile::with_suffix(".zip").unwrap();
        {
            let mut writer = zip::ZipWriter::new(fs::File::create(archive_file.path()).unwrap());
            writer
                .start_file("locations.list", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"A (2006)\tParis, France\n").unwrap();
            writer.finish().unwrap();
        }

        let extracted = extract_first_entry_from_zip(archive_file.path()).unwrap();
        let content = fs::read_to_string(extracted.path()).unwrap();
        assert_eq!(content, "A (2006)\tParis, France\n");
    }

    #[test]
    fn test_extract_from_empty_zip_fails() {
        let archive_file = NamedTempFile::with_suffix(".zip").unwrap();
        {
            let writer = zip::ZipWriter::new(fs::File::create(archive_file.path()).unwrap());
            writer.finish().unwrap();
        }

        assert!(extract_first_entry_from_zip(archive_file.path()).is_err());
    }
}
