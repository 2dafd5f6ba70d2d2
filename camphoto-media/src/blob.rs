//! Encoded image containers handed back to the caller

use bytes::Bytes;

/// Immutable bytes with a media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    data: Bytes,
    mime_type: String,
}

impl Blob {
    /// Blob from encoded bytes
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Encoded bytes
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Media type, e.g. `image/png`
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-byte blob
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A blob with a file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    name: String,
    blob: Blob,
}

impl File {
    /// Wrap `blob` under `name`, keeping the blob's media type
    pub fn from_blob(blob: Blob, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blob,
        }
    }

    /// File name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Media type of the contents
    pub fn mime_type(&self) -> &str {
        self.blob.mime_type()
    }

    /// Contents
    pub fn blob(&self) -> &Blob {
        &self.blob
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.blob.size()
    }

    /// Drop the name and keep the contents
    pub fn into_blob(self) -> Blob {
        self.blob
    }
}
