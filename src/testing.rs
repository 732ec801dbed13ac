//! Test doubles shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::activation::{FileItem, FileRef};
use crate::error::ActivationError;
use crate::import::Importer;

/// In-memory storage item that counts reads.
pub struct MemFile {
    name: String,
    content: Option<Vec<u8>>,
    regular: bool,
    reads: AtomicUsize,
}

impl MemFile {
    pub fn new(name: &str, content: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            content: Some(content),
            regular: true,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn arc(name: &str, content: Vec<u8>) -> FileRef {
        Arc::new(Self::new(name, content))
    }

    pub fn directory(name: &str) -> Self {
        Self {
            regular: false,
            ..Self::new(name, Vec::new())
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            content: None,
            ..Self::new(name, Vec::new())
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileItem for MemFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_regular_file(&self) -> bool {
        self.regular
    }

    async fn read_all_bytes(&self) -> std::io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.content
            .clone()
            .ok_or_else(|| std::io::Error::other("device not ready"))
    }
}

/// Importer that records every call.
pub struct Recorder {
    calls: Mutex<Vec<(Vec<u8>, bool)>>,
    fail: Option<String>,
}

impl Recorder {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail: None,
        })
    }

    pub fn failing(msg: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail: Some(msg.to_string()),
        })
    }

    pub fn calls(&self) -> Vec<(Vec<u8>, bool)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Importer for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    async fn import_decoded(
        &self,
        payload: Vec<u8>,
        create_new_if_missing: bool,
    ) -> Result<(), ActivationError> {
        self.calls.lock().push((payload, create_new_if_missing));
        match &self.fail {
            None => Ok(()),
            Some(msg) => Err(ActivationError::Import { error: msg.clone() }),
        }
    }
}
