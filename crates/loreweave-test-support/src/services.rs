//! Test services — scripted `TextCompletion`, `ImageGeneration` and
//! `ImageHosting` doubles.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use loreweave_core::service::{
    ImageGeneration, ImageHandle, ImageHosting, ServiceError, TextCompletion,
};

/// A text service that answers by matching substrings of the prompt.
///
/// Rules are checked in insertion order; the first rule whose needle occurs
/// in the prompt wins, otherwise the fallback reply is returned. Every prompt
/// is recorded.
#[derive(Debug)]
pub struct ScriptedTextService {
    rules: Vec<(String, Result<String, ServiceError>)>,
    fallback: Result<String, ServiceError>,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedTextService {
    /// A service replying `text` to every prompt.
    #[must_use]
    pub fn replying(text: &str) -> Self {
        Self {
            rules: Vec::new(),
            fallback: Ok(text.to_owned()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Reply `text` to prompts containing `needle`.
    #[must_use]
    pub fn when_contains(mut self, needle: &str, text: &str) -> Self {
        self.rules.push((needle.to_owned(), Ok(text.to_owned())));
        self
    }

    /// Fail prompts containing `needle` with `error`.
    #[must_use]
    pub fn when_contains_fail(mut self, needle: &str, error: ServiceError) -> Self {
        self.rules.push((needle.to_owned(), Err(error)));
        self
    }

    /// Sleep before answering, to widen race windows in concurrency tests.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Snapshot of every prompt received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of prompts received that contain `needle`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls_containing(&self, needle: &str) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contains(needle))
            .count()
    }
}

#[async_trait]
impl TextCompletion for ScriptedTextService {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map_or_else(|| self.fallback.clone(), |(_, reply)| reply.clone())
    }
}

/// A text service that always fails with a server error.
#[derive(Debug, Default)]
pub struct FailingTextService {
    calls: AtomicUsize,
}

impl FailingTextService {
    /// Number of calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextCompletion for FailingTextService {
    async fn complete(&self, _prompt: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ServiceError::Server { status: 500 })
    }
}

/// An image service returning a fixed handle, optionally failing the first
/// `n` calls with a scripted error.
#[derive(Debug)]
pub struct StaticImageService {
    handle: ImageHandle,
    failures: Mutex<Vec<ServiceError>>,
    calls: AtomicUsize,
}

impl StaticImageService {
    /// Always returns `handle`.
    #[must_use]
    pub fn new(handle: ImageHandle) -> Self {
        Self {
            handle,
            failures: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails the first `count` calls with `error` before succeeding.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn failing_first(self, count: usize, error: &ServiceError) -> Self {
        self.failures
            .lock()
            .unwrap()
            .extend(std::iter::repeat_n(error.clone(), count));
        self
    }

    /// Number of calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGeneration for StaticImageService {
    async fn generate(&self, _prompt: &str) -> Result<ImageHandle, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut failures = self.failures.lock().unwrap();
        if failures.is_empty() {
            Ok(self.handle.clone())
        } else {
            Err(failures.remove(0))
        }
    }
}

/// An image service that always fails with the configured error.
#[derive(Debug)]
pub struct FailingImageService {
    error: ServiceError,
    calls: AtomicUsize,
}

impl FailingImageService {
    /// Fails every call with `error`.
    #[must_use]
    pub fn new(error: ServiceError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGeneration for FailingImageService {
    async fn generate(&self, _prompt: &str) -> Result<ImageHandle, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

/// An image host that records uploads and answers with predictable URLs, or
/// fails every upload when built with `failing`.
#[derive(Debug, Default)]
pub struct RecordingImageHost {
    fail: bool,
    uploads: Mutex<Vec<ImageHandle>>,
}

impl RecordingImageHost {
    /// A host whose uploads succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose uploads fail with a server error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            uploads: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of uploaded handles.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn uploads(&self) -> Vec<ImageHandle> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageHosting for RecordingImageHost {
    async fn upload(&self, image: &ImageHandle) -> Result<String, ServiceError> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(image.clone());
        if self.fail {
            return Err(ServiceError::Server { status: 502 });
        }
        Ok(format!("https://cdn.test/scenes/{}.png", uploads.len()))
    }
}
