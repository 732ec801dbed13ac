//! # Importer boundary.
//!
//! The embedding application supplies an [`Importer`] that decodes the
//! extracted payload and opens it. [`ImporterFn`] wraps a closure
//! `F: Fn(Vec<u8>, bool) -> Fut`, producing a fresh future per call.
//!
//! ## Example
//! ```rust
//! use activator::{ActivationError, ImporterFn, ImporterRef};
//!
//! let imp: ImporterRef = ImporterFn::arc("editor", |payload: Vec<u8>, create_new: bool| async move {
//!     if payload.is_empty() && !create_new {
//!         return Err(ActivationError::Import { error: "empty payload".into() });
//!     }
//!     Ok(())
//! });
//! assert_eq!(imp.name(), "editor");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ActivationError;

/// Shared handle to an importer.
pub type ImporterRef = Arc<dyn Importer>;

/// Decodes and opens an activation payload.
#[async_trait]
pub trait Importer: Send + Sync + 'static {
    /// Name used in events and logs.
    fn name(&self) -> &str {
        "importer"
    }

    /// Imports `payload`.
    ///
    /// `create_new_if_missing` asks the importer to fabricate a new project when
    /// the payload cannot be attached to an existing target.
    async fn import_decoded(
        &self,
        payload: Vec<u8>,
        create_new_if_missing: bool,
    ) -> Result<(), ActivationError>;
}

/// Function-backed importer.
pub struct ImporterFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ImporterFn<F> {
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the importer and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Importer for ImporterFn<F>
where
    F: Fn(Vec<u8>, bool) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ActivationError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn import_decoded(
        &self,
        payload: Vec<u8>,
        create_new_if_missing: bool,
    ) -> Result<(), ActivationError> {
        (self.f)(payload, create_new_if_missing).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[tokio::test]
    async fn test_closure_receives_payload_and_flag() {
        let seen: Arc<Mutex<Vec<(Vec<u8>, bool)>>> = Arc::default();
        let s = Arc::clone(&seen);
        let imp = ImporterFn::arc("rec", move |p: Vec<u8>, c: bool| {
            let s = Arc::clone(&s);
            async move {
                s.lock().push((p, c));
                Ok::<(), ActivationError>(())
            }
        });

        imp.import_decoded(vec![1, 2, 3], true).await.unwrap();
        assert_eq!(*seen.lock(), vec![(vec![1, 2, 3], true)]);
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let imp = ImporterFn::new("bad", |_p: Vec<u8>, _c: bool| async {
            Err::<(), _>(ActivationError::Import {
                error: "not a hex file".into(),
            })
        });
        let err = imp.import_decoded(Vec::new(), false).await.unwrap_err();
        assert_eq!(err.as_label(), "activation_import_failed");
    }
}
