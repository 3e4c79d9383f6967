//! # Image Uploads
//!
//! A file chosen for an image field is read asynchronously and turned into a
//! `data:` URI. The edit that started the read returns immediately with an
//! [`UploadTicket`]; the mutation and history save happen later, when the
//! session completes the ticket with the encoded result.
//!
//! Between request and completion the user may select another node or undo
//! the target away, so a ticket is checked against the live document (and,
//! depending on [`UploadPolicy`], the selection) before it applies.

use crate::config::UploadPolicy;
use crate::document::Document;
use crate::node::NodeId;
use crate::schema::FieldDescriptor;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File is empty: {0}")]
    Empty(PathBuf),

    #[error("Unknown upload ticket {0}")]
    UnknownTicket(u64),
}

/// A pending file read bound to the node and field that requested it
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTicket {
    pub id: u64,
    pub node_id: NodeId,
    pub field: &'static FieldDescriptor,
    /// Selection at the moment the upload was requested
    pub selection_at_request: Option<NodeId>,
}

impl UploadTicket {
    /// Whether the finished upload may still be applied
    pub fn is_applicable(
        &self,
        doc: &Document,
        selection: Option<&NodeId>,
        policy: UploadPolicy,
    ) -> bool {
        if !doc.contains(&self.node_id) {
            return false;
        }
        match policy {
            UploadPolicy::TargetPresent => true,
            UploadPolicy::TargetSelected => selection == self.selection_at_request.as_ref(),
        }
    }
}

/// MIME type guessed from the file extension
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("bmp") => "image/bmp",
        Some("ico") => "image/x-icon",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Read `path` and encode it as a `data:` URI
pub async fn read_data_uri(path: impl AsRef<Path>) -> Result<String, UploadError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|source| UploadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.is_empty() {
        return Err(UploadError::Empty(path.to_path_buf()));
    }

    Ok(encode_data_uri(mime_for(path), &bytes))
}
