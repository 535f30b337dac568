//! Job driver
//!
//! A [`PrintJob`] owns one engine handle from creation to release. The handle
//! is freed by [`PrintJob::destroy`] or, on every other exit path, by `Drop`.
//! Every engine result block is copied into a [`JobResult`] and released
//! before the copy is returned.

use std::ffi::CString;
use std::time::{Duration, Instant};

use lamicoid_core::{DeviceModel, EngineError};

use super::{PrintEngine, ProgressSnapshot};

/// Lifecycle state of a job handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Allocated, no work done yet
    Created,
    /// At least one unit of work done
    Running,
    /// The print file is ready
    Completed,
    /// The engine reported an error
    Failed,
    /// The engine observed an abort request
    Aborted,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Aborted)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Aborted => "Aborted",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecutionMode {
    Chunked,
    Blocking,
}

impl ExecutionMode {
    fn name(self) -> &'static str {
        match self {
            Self::Chunked => "chunked",
            Self::Blocking => "blocking",
        }
    }
}

/// Print file bytes plus the engine's error message, if any.
///
/// A present error message makes the bytes unusable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobResult {
    pub bytes: Vec<u8>,
    pub error: Option<String>,
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// The print file, or the engine's message as a generation error.
    pub fn into_bytes(self) -> Result<Vec<u8>, EngineError> {
        match self.error {
            Some(message) => Err(EngineError::Generation { message }),
            None => Ok(self.bytes),
        }
    }
}

/// Creates jobs against one engine.
#[derive(Debug)]
pub struct JobDriver<E: PrintEngine> {
    engine: E,
}

impl<E: PrintEngine> JobDriver<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Allocate a job for `svg` and `settings`.
    ///
    /// A handle the engine flags as errored straight after allocation is
    /// released here and reported as a creation error.
    pub fn create(
        &self,
        svg: &str,
        settings: &str,
        model: DeviceModel,
    ) -> Result<PrintJob<'_, E>, EngineError> {
        let svg = CString::new(svg).map_err(|_| EngineError::InvalidArgument { argument: "svg" })?;
        let settings = CString::new(settings)
            .map_err(|_| EngineError::InvalidArgument { argument: "settings" })?;

        let handle = self
            .engine
            .new_job(&svg, &settings, model)
            .ok_or_else(|| EngineError::Creation {
                message: "engine returned a null generator".to_string(),
            })?;

        if self.engine.has_error(&handle) {
            let message = self
                .engine
                .error_string(&handle)
                .unwrap_or_else(|| "unknown engine error".to_string());
            self.engine.free_job(handle);
            let err = EngineError::Creation { message };
            tracing::error!(
                status = err.status().as_raw(),
                "Engine rejected job for {}: {}",
                model,
                err
            );
            return Err(err);
        }

        tracing::info!("Created print job for {}", model);
        Ok(PrintJob {
            engine: &self.engine,
            handle: Some(handle),
            state: JobState::Created,
            mode: None,
            chunks: 0,
            model,
            _svg: svg,
            _settings: settings,
        })
    }

    /// Create a job, supply `fonts`, run it to completion and release it.
    pub fn generate(
        &self,
        svg: &str,
        settings: &str,
        model: DeviceModel,
        fonts: &[Vec<u8>],
    ) -> Result<Vec<u8>, EngineError> {
        let mut job = self.create(svg, settings, model)?;
        for font in fonts {
            job.add_font_data(font)?;
        }
        let result = job.run_to_completion();
        job.destroy();
        result?.into_bytes()
    }

    pub fn api_version(&self) -> Option<String> {
        self.engine.api_version()
    }
}

/// One engine job handle and its lifecycle state.
///
/// Execution is either chunked ([`run_chunk`](Self::run_chunk)) or blocking
/// ([`run_to_completion`](Self::run_to_completion)), never both on one job.
pub struct PrintJob<'e, E: PrintEngine> {
    engine: &'e E,
    handle: Option<E::Handle>,
    state: JobState,
    mode: Option<ExecutionMode>,
    chunks: u64,
    model: DeviceModel,
    // The engine may keep pointers into its inputs.
    _svg: CString,
    _settings: CString,
}

impl<'e, E: PrintEngine> PrintJob<'e, E> {
    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn model(&self) -> DeviceModel {
        self.model
    }

    /// Number of chunks run so far.
    pub fn chunks_run(&self) -> u64 {
        self.chunks
    }

    fn handle(&self) -> Result<&E::Handle, EngineError> {
        self.handle
            .as_ref()
            .ok_or_else(|| EngineError::AlreadyFinished {
                state: "Destroyed".to_string(),
            })
    }

    fn enter(&mut self, mode: ExecutionMode, requested: &'static str) -> Result<(), EngineError> {
        match self.mode {
            Some(current) if current != mode => Err(EngineError::MixedExecution {
                current: current.name(),
                requested,
            }),
            _ => {
                self.mode = Some(mode);
                Ok(())
            }
        }
    }

    /// Supply font bytes before execution starts.
    pub fn add_font_data(&mut self, data: &[u8]) -> Result<(), EngineError> {
        if self.state != JobState::Created {
            return Err(EngineError::AlreadyFinished {
                state: self.state.to_string(),
            });
        }
        let handle = self.handle()?;
        self.engine
            .add_font_data(handle, data)
            .map_err(|message| EngineError::FontData { message })?;
        tracing::debug!("Added {} bytes of font data", data.len());
        Ok(())
    }

    /// Do one bounded unit of work.
    ///
    /// Returns whether more chunks are needed. Once the job settles into a
    /// terminal state further calls return `Ok(false)` without touching the
    /// engine.
    pub fn run_chunk(&mut self) -> Result<bool, EngineError> {
        self.enter(ExecutionMode::Chunked, "run a chunk")?;
        if self.state.is_terminal() {
            return Ok(false);
        }

        let more = self.engine.run_chunk(self.handle()?);
        self.chunks += 1;
        self.state = JobState::Running;
        self.settle();

        if self.state.is_terminal() {
            tracing::debug!("Job settled as {} after {} chunks", self.state, self.chunks);
            return Ok(false);
        }
        if !more {
            tracing::warn!("Engine reported no more work but the job is not complete");
            self.state = JobState::Failed;
            return Ok(false);
        }
        tracing::debug!("Ran chunk {}", self.chunks);
        Ok(true)
    }

    fn settle(&mut self) {
        let Some(handle) = self.handle.as_ref() else {
            return;
        };
        if self.engine.was_aborted(handle) {
            self.state = JobState::Aborted;
        } else if self.engine.has_error(handle) {
            self.state = JobState::Failed;
        } else if self.engine.is_complete(handle) {
            self.state = JobState::Completed;
        }
    }

    /// Do all remaining work in one blocking call.
    pub fn run_to_completion(&mut self) -> Result<JobResult, EngineError> {
        self.enter(ExecutionMode::Blocking, "run to completion")?;
        if self.state.is_terminal() {
            return Err(EngineError::AlreadyFinished {
                state: self.state.to_string(),
            });
        }

        self.state = JobState::Running;
        let output = self.engine.run_until_complete(self.handle()?);
        let mut result = self.take_output(output);
        self.settle();

        match self.state {
            JobState::Aborted => Err(EngineError::Aborted),
            JobState::Failed => {
                if result.error.is_none() {
                    result.error = Some(self.failure_message());
                }
                tracing::error!("Print file generation failed: {}", self.failure_message());
                Ok(result)
            }
            _ => {
                if result.is_success() {
                    self.state = JobState::Completed;
                } else {
                    self.state = JobState::Failed;
                }
                Ok(result)
            }
        }
    }

    fn failure_message(&self) -> String {
        self.error_string()
            .unwrap_or_else(|| "unknown engine error".to_string())
    }

    /// Copy an output block into owned memory and release it.
    fn take_output(&self, output: E::Output) -> JobResult {
        let bytes = self.engine.output_bytes(&output);
        let error = self.engine.output_error(&output);
        self.engine.free_output(output);
        if bytes.is_empty() && error.is_none() {
            tracing::warn!("Engine returned an empty print file");
        }
        JobResult { bytes, error }
    }

    /// Ask the engine to stop. The job settles as aborted on a later chunk.
    ///
    /// Returns `false` without calling the engine once the job is terminal.
    pub fn request_abort(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        match self.handle.as_ref() {
            Some(handle) => {
                tracing::info!("Requesting abort of print job");
                self.engine.request_abort(handle)
            }
            None => false,
        }
    }

    pub fn poll_progress(&self) -> ProgressSnapshot {
        self.handle
            .as_ref()
            .map(|handle| self.engine.progress(handle))
            .unwrap_or_default()
    }

    pub fn is_complete(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| self.engine.is_complete(handle))
    }

    pub fn has_error(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| self.engine.has_error(handle))
    }

    pub fn was_aborted(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| self.engine.was_aborted(handle))
    }

    /// The engine's message; meaningful only when [`has_error`](Self::has_error).
    pub fn error_string(&self) -> Option<String> {
        self.handle
            .as_ref()
            .and_then(|handle| self.engine.error_string(handle))
    }

    /// Result of a completed job. Never queries the engine before completion.
    pub fn get_result(&self) -> Result<JobResult, EngineError> {
        let handle = self.handle()?;
        if !self.engine.is_complete(handle) {
            return Err(EngineError::NotComplete);
        }
        let output = self.engine.result(handle);
        Ok(self.take_output(output))
    }

    /// The terminal outcome of a chunked run.
    fn outcome(&self) -> Result<JobResult, EngineError> {
        match self.state {
            JobState::Aborted => Err(EngineError::Aborted),
            JobState::Failed => {
                let message = self.failure_message();
                tracing::error!("Print file generation failed: {}", message);
                Ok(JobResult {
                    bytes: Vec::new(),
                    error: Some(message),
                })
            }
            _ => self.get_result(),
        }
    }

    /// Run chunks until the job settles, reporting progress after each one,
    /// then release the handle.
    ///
    /// Stops calling the engine once `timeout` has elapsed. The deadline is
    /// only checked after a chunk that reports more work; a chunk already
    /// running inside the engine is never interrupted, so a single long
    /// chunk can overrun `timeout`.
    pub fn run_with_deadline<F>(
        mut self,
        timeout: Duration,
        mut on_progress: F,
    ) -> Result<JobResult, EngineError>
    where
        F: FnMut(&ProgressSnapshot),
    {
        let started = Instant::now();
        let outcome = loop {
            match self.run_chunk() {
                Ok(true) => {}
                Ok(false) => break self.outcome(),
                Err(e) => break Err(e),
            }
            on_progress(&self.poll_progress());
            if started.elapsed() >= timeout {
                break Err(self.timed_out(timeout));
            }
        };
        self.destroy();
        outcome
    }

    /// Drive chunks from an async task, yielding to the runtime between
    /// chunks, then release the handle.
    pub async fn run_cooperative<F>(
        mut self,
        timeout: Duration,
        mut on_progress: F,
    ) -> Result<JobResult, EngineError>
    where
        F: FnMut(&ProgressSnapshot),
    {
        let job = &mut self;
        let driven = tokio::time::timeout(timeout, async {
            while job.run_chunk()? {
                on_progress(&job.poll_progress());
                tokio::task::yield_now().await;
            }
            Ok::<(), EngineError>(())
        })
        .await;

        let outcome = match driven {
            Ok(Ok(())) => self.outcome(),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(self.timed_out(timeout)),
        };
        self.destroy();
        outcome
    }

    fn timed_out(&mut self, timeout: Duration) -> EngineError {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let err = EngineError::Timeout { timeout_ms };
        tracing::error!(
            status = err.status().as_raw(),
            "Print job timed out after {}ms ({} chunks)",
            timeout_ms,
            self.chunks
        );
        self.request_abort();
        err
    }

    /// Release the engine handle.
    pub fn destroy(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.engine.free_job(handle);
            tracing::info!("Released print job for {} in state {}", self.model, self.state);
        }
    }
}

impl<E: PrintEngine> Drop for PrintJob<'_, E> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<E: PrintEngine> std::fmt::Debug for PrintJob<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrintJob")
            .field("model", &self.model)
            .field("state", &self.state)
            .field("chunks", &self.chunks)
            .field("live", &self.handle.is_some())
            .finish()
    }
}
