use std::path::Path;

use base64::{Engine, engine::general_purpose::STANDARD};
use uuid::Uuid;

use crate::error::AppError;

const IMAGE_DIR: &str = "recipes/images";

/// Décode une image `data:image/<ext>;base64,<payload>` sans rien écrire.
/// Retourne l'extension et les octets.
pub fn decode_data_uri(data_uri: &str) -> Result<(String, Vec<u8>), AppError> {
    let (header, payload) = data_uri
        .split_once(";base64,")
        .ok_or_else(|| AppError::Validation("Image must be a base64 data URI".to_string()))?;

    let extension = header
        .strip_prefix("data:image/")
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .ok_or_else(|| AppError::Validation(format!("Unsupported image type: {}", header)))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| AppError::Validation(format!("Invalid image payload: {}", e)))?;

    if bytes.is_empty() {
        return Err(AppError::Validation("Image is empty".to_string()));
    }

    Ok((extension.to_ascii_lowercase(), bytes))
}

/// Écrit l'image sous `<media_root>/recipes/images/<uuid>.<ext>`
/// et retourne le chemin relatif à stocker dans recipes.image
pub async fn save_base64_image(media_root: &Path, data_uri: &str) -> Result<String, AppError> {
    let (extension, bytes) = decode_data_uri(data_uri)?;

    let relative_path = format!("{}/{}.{}", IMAGE_DIR, Uuid::new_v4(), extension);
    let target = media_root.join(&relative_path);

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&target, bytes).await?;

    log::debug!("Image saved: {}", target.display());
    Ok(relative_path)
}
