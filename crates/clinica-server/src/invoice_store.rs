//! Disk storage for generated invoice PDFs.
//!
//! Invoices are written as `<uuid>.pdf` under the configured storage
//! directory. File names come only from generated UUIDs, but paths are
//! still validated against traversal before any filesystem access.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ServerError;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Verify that a resolved path stays within the expected base directory.
fn ensure_within(base: &Path, target: &Path) -> Result<PathBuf, ServerError> {
    // Canonicalize base; target may not exist yet so normalize manually
    let canonical_base = base.canonicalize().unwrap_or_else(|_| base.to_path_buf());
    let mut resolved = canonical_base.clone();
    for component in target
        .strip_prefix(&canonical_base)
        .unwrap_or(target)
        .components()
    {
        match component {
            std::path::Component::Normal(c) => resolved.push(c),
            std::path::Component::ParentDir => {
                return Err(ServerError::BadRequest(
                    "Path traversal detected".to_string(),
                ));
            }
            _ => {} // RootDir, CurDir, Prefix — skip
        }
    }
    if !resolved.starts_with(&canonical_base) {
        return Err(ServerError::BadRequest(
            "Path traversal detected".to_string(),
        ));
    }
    Ok(resolved)
}

#[derive(Debug, Clone)]
pub struct InvoiceStore {
    base_path: PathBuf,
    max_size: usize,
}

impl InvoiceStore {
    pub async fn new(base_path: PathBuf, max_size: usize) -> Result<Self, ServerError> {
        fs::create_dir_all(&base_path).await.map_err(|e| {
            ServerError::InvoiceStorage(format!(
                "Failed to create invoice directory '{}': {}",
                base_path.display(),
                e
            ))
        })?;

        info!(path = %base_path.display(), "Invoice store initialized");

        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Store an uploaded PDF and return its id.
    ///
    /// Rejects empty uploads, uploads over the size cap, and anything that
    /// does not carry the `%PDF` magic.
    pub async fn store_invoice(&self, data: &[u8]) -> Result<Uuid, ServerError> {
        if data.is_empty() {
            return Err(ServerError::BadRequest("Empty invoice".to_string()));
        }
        if data.len() > self.max_size {
            return Err(ServerError::InvoiceTooLarge {
                size: data.len(),
                max: self.max_size,
            });
        }
        if !data.starts_with(PDF_MAGIC) {
            return Err(ServerError::BadRequest(
                "Upload is not a PDF document".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let path = self.safe_invoice_path(&id)?;

        fs::write(&path, data).await.map_err(|e| {
            ServerError::InvoiceStorage(format!("Failed to write invoice {}: {}", id, e))
        })?;

        debug!(id = %id, size = data.len(), "Stored invoice");
        Ok(id)
    }

    pub async fn get_invoice(&self, id: Uuid) -> Result<Vec<u8>, ServerError> {
        let path = self.safe_invoice_path(&id)?;

        if !path.exists() {
            return Err(ServerError::InvoiceNotFound(id));
        }

        let data = fs::read(&path).await.map_err(|e| {
            ServerError::InvoiceStorage(format!("Failed to read invoice {}: {}", id, e))
        })?;

        debug!(id = %id, size = data.len(), "Retrieved invoice");
        Ok(data)
    }

    pub async fn delete_invoice(&self, id: Uuid) -> Result<(), ServerError> {
        let path = self.safe_invoice_path(&id)?;

        if !path.exists() {
            return Err(ServerError::InvoiceNotFound(id));
        }

        fs::remove_file(&path).await.map_err(|e| {
            ServerError::InvoiceStorage(format!("Failed to delete invoice {}: {}", id, e))
        })?;

        debug!(id = %id, "Deleted invoice");
        Ok(())
    }

    fn safe_invoice_path(&self, id: &Uuid) -> Result<PathBuf, ServerError> {
        let raw = self.base_path.join(format!("{id}.pdf"));
        ensure_within(&self.base_path, &raw)
    }
}
