use crate::error::AppError;
use crate::models::session_types::ImageRef;
use std::io;
use std::path::Path;
use tauri_plugin_fs::FilePath;
use tracing::debug;

const PICKED_NAME: &str = "picked_img";

/// Turn a picker result into a reference the decoder can open. Local paths
/// and `file:` URLs are used in place; anything else (an Android
/// `content://` URI) is read through `read_uri` and copied into `cache_dir`.
pub fn materialize_pick(
    file: FilePath,
    cache_dir: &Path,
    read_uri: impl FnOnce(FilePath) -> io::Result<Vec<u8>>,
) -> Result<ImageRef, AppError> {
    let url = match file {
        FilePath::Path(path) => return Ok(ImageRef::from_path(path)),
        FilePath::Url(url) => url,
    };

    if url.scheme() == "file" {
        return url
            .to_file_path()
            .map(ImageRef::from_path)
            .map_err(|_| AppError::decode(format!("Invalid file URI: {}", url)));
    }

    let bytes = read_uri(FilePath::Url(url.clone()))
        .map_err(|e| AppError::decode(format!("Failed to read {}: {}", url, e)))?;

    std::fs::create_dir_all(cache_dir)?;
    let dest = cache_dir.join(PICKED_NAME);
    std::fs::write(&dest, &bytes)?;
    debug!(source = %url, dest = %dest.display(), bytes = bytes.len(), "copied picked image");

    Ok(ImageRef::from_path(dest))
}
