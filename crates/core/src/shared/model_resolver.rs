use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::APP_DIR_NAME;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine the user data directory")]
    NoDataDir,
    #[error("model {name} not found in {weights_dir} and no download URL is configured")]
    NotFound { name: String, weights_dir: PathBuf },
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// The two directories the application keeps on disk.
#[derive(Clone, Debug, PartialEq)]
pub struct AppDirs {
    pub weights_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl AppDirs {
    /// Platform data directory layout:
    /// `<data_dir>/MoodLens/weights` and `<data_dir>/MoodLens/outputs`.
    pub fn platform_default() -> Result<Self, ModelResolveError> {
        let base = dirs::data_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .ok_or(ModelResolveError::NoDataDir)?;
        Ok(Self {
            weights_dir: base.join("weights"),
            output_dir: base.join("outputs"),
        })
    }

    /// Creates both directories if missing.
    pub fn ensure_exist(&self) -> Result<(), ModelResolveError> {
        for dir in [&self.weights_dir, &self.output_dir] {
            fs::create_dir_all(dir).map_err(|e| ModelResolveError::CreateDir {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}

/// `<cache_dir>/MoodLens`, where models shared with other installs live.
pub fn shared_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join(APP_DIR_NAME))
}

/// Resolve a model file by name.
///
/// Resolution order:
/// 1. The weights directory
/// 2. `cache_dir`, if given
/// 3. Download from `url` into the weights directory, if a URL is given
pub fn resolve(
    name: &str,
    weights_dir: &Path,
    cache_dir: Option<&Path>,
    url: Option<&str>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let local = weights_dir.join(name);
    if local.exists() {
        return Ok(local);
    }

    if let Some(cached) = cache_dir.map(|d| d.join(name)) {
        if cached.exists() {
            return Ok(cached);
        }
    }

    let Some(url) = url else {
        return Err(ModelResolveError::NotFound {
            name: name.to_string(),
            weights_dir: weights_dir.to_path_buf(),
        });
    };

    fs::create_dir_all(weights_dir).map_err(|e| ModelResolveError::CreateDir {
        path: weights_dir.to_path_buf(),
        source: e,
    })?;
    log::info!("Downloading {name} from {url}");
    download(url, &local, progress)?;
    Ok(local)
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let temp_path = dest.with_extension("part");

    let result = download_inner(url, dest, &temp_path, progress);

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn download_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ModelResolveError> {
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let bytes = response.bytes().map_err(|e| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;

    let write_err = |e| ModelResolveError::Write {
        path: temp_path.to_path_buf(),
        source: e,
    };
    let mut file = fs::File::create(temp_path).map_err(write_err)?;

    let mut downloaded: u64 = 0;
    for chunk in bytes.chunks(1024 * 1024) {
        file.write_all(chunk).map_err(write_err)?;
        downloaded += chunk.len() as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }
    file.flush().map_err(write_err)?;
    drop(file);

    fs::rename(temp_path, dest).map_err(|e| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })
}
