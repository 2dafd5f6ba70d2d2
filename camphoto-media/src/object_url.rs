//! Object URLs for blobs, files and streams
//!
//! URLs created here stay valid until revoked; nothing revokes them
//! automatically.

use crate::blob::{Blob, File};
use camphoto_core::{CameraResult, StreamHandle};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// What an object URL points at
#[derive(Debug, Clone)]
pub enum ObjectUrlSource {
    /// Encoded image
    Blob(Blob),
    /// Named encoded image
    File(File),
    /// Live stream, for elements that cannot take a stream object
    Stream(StreamHandle),
}

impl From<Blob> for ObjectUrlSource {
    fn from(blob: Blob) -> Self {
        ObjectUrlSource::Blob(blob)
    }
}

impl From<File> for ObjectUrlSource {
    fn from(file: File) -> Self {
        ObjectUrlSource::File(file)
    }
}

/// Object-URL creation and revocation
pub trait ObjectUrls: fmt::Debug {
    /// Create a URL referencing `source`
    fn create_object_url(&self, source: ObjectUrlSource) -> CameraResult<String>;

    /// Release a URL; unknown URLs are ignored
    fn revoke_object_url(&self, url: &str);
}

/// In-memory object URL table
#[derive(Debug)]
pub struct ObjectUrlRegistry {
    origin: String,
    entries: RefCell<HashMap<String, ObjectUrlSource>>,
}

impl ObjectUrlRegistry {
    /// Registry minting `blob:<origin>/<uuid>` URLs
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Source behind a live URL
    pub fn resolve(&self, url: &str) -> Option<ObjectUrlSource> {
        self.entries.borrow().get(url).cloned()
    }

    /// Number of live URLs
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// True when no URL is live
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Default for ObjectUrlRegistry {
    fn default() -> Self {
        Self::new("camphoto")
    }
}

impl ObjectUrls for ObjectUrlRegistry {
    fn create_object_url(&self, source: ObjectUrlSource) -> CameraResult<String> {
        let url = format!("blob:{}/{}", self.origin, Uuid::new_v4());
        debug!("🔗 Created object URL {}", url);
        self.entries.borrow_mut().insert(url.clone(), source);
        Ok(url)
    }

    fn revoke_object_url(&self, url: &str) {
        if self.entries.borrow_mut().remove(url).is_some() {
            debug!("🔗 Revoked object URL {}", url);
        }
    }
}
