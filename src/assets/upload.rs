use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{DpError, DpResult};

/// A file handed to the compositor by the user.
#[derive(Clone, Debug)]
pub struct Upload {
    pub file_name: String,
    /// Declared MIME type, if the host provided one.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.map(str::to_owned),
            bytes,
        }
    }

    /// Read a file from disk, declaring its MIME type from the extension when recognized.
    pub fn from_path(path: &Path) -> DpResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read upload '{}'", path.display()))?;
        let content_type = image::ImageFormat::from_path(path)
            .ok()
            .map(|f| f.to_mime_type().to_owned());
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Declared MIME type, or one sniffed from the leading bytes.
    pub fn mime_type(&self) -> Option<String> {
        if let Some(ct) = &self.content_type {
            return Some(ct.trim().to_ascii_lowercase());
        }
        image::guess_format(&self.bytes)
            .ok()
            .map(|f| f.to_mime_type().to_owned())
    }
}

/// Limits applied to image uploads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: Option<u64>,
}

impl UploadPolicy {
    /// Attendee uploads are capped at 5 MiB.
    pub const PUBLIC_MAX_BYTES: u64 = 5 * 1024 * 1024;

    pub fn public() -> Self {
        Self {
            max_bytes: Some(Self::PUBLIC_MAX_BYTES),
        }
    }

    /// Organizer uploads have no size cap.
    pub fn admin() -> Self {
        Self { max_bytes: None }
    }
}

/// Reject non-image uploads and uploads over the policy's byte cap.
pub fn validate_image_upload(upload: &Upload, policy: &UploadPolicy) -> DpResult<()> {
    let mime = upload.mime_type().unwrap_or_default();
    if !mime.starts_with("image/") {
        tracing::debug!(file = %upload.file_name, %mime, "rejected non-image upload");
        return Err(DpError::invalid_file_type(format!(
            "'{}' is not an image ({})",
            upload.file_name,
            if mime.is_empty() { "unknown type" } else { mime.as_str() }
        )));
    }
    if let Some(limit) = policy.max_bytes
        && upload.size() > limit
    {
        tracing::debug!(file = %upload.file_name, size = upload.size(), limit, "rejected oversized upload");
        return Err(DpError::FileTooLarge {
            size: upload.size(),
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/upload.rs"]
mod tests;
