//! Scripted in-process engine that counts every allocation it hands out.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::ffi::CStr;

use lamicoid_communication::{PrintEngine, ProgressSnapshot, ProgressType};
use lamicoid_core::DeviceModel;

/// How the mock engine behaves for every job it creates.
#[derive(Debug, Clone)]
pub struct Script {
    /// Chunks needed before the job completes.
    pub chunks_to_complete: usize,
    /// Error flag raised right after allocation.
    pub creation_error: Option<String>,
    /// Return a null generator from allocation.
    pub null_handle: bool,
    /// Fail with a message once this many chunks have run.
    pub fail_after: Option<(usize, String)>,
    /// Chunks run after an abort request before the abort is observed.
    pub abort_latency: usize,
    pub font_error: Option<String>,
    pub output: Vec<u8>,
    pub send_succeeds: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            chunks_to_complete: 3,
            creation_error: None,
            null_handle: false,
            fail_after: None,
            abort_latency: 1,
            font_error: None,
            output: b"PRN".to_vec(),
            send_succeeds: true,
        }
    }
}

#[derive(Debug, Default)]
struct Job {
    chunks: usize,
    abort_requested_at: Option<usize>,
    aborted: bool,
    complete: bool,
    error: Option<String>,
    fonts: usize,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    jobs: HashMap<u32, Job>,
    created: usize,
    freed: usize,
    live_outputs: HashSet<u32>,
    outputs: usize,
    result_calls: usize,
    early_result_calls: usize,
    abort_requests: usize,
    sends: Vec<(DeviceModel, Vec<u8>, String)>,
}

#[derive(Debug)]
pub struct MockHandle(u32);

#[derive(Debug)]
pub struct MockOutput {
    id: u32,
    bytes: Vec<u8>,
    error: Option<String>,
}

#[derive(Debug, Default)]
pub struct MockEngine {
    script: Script,
    state: RefCell<State>,
}

impl MockEngine {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            state: RefCell::default(),
        }
    }

    pub fn created(&self) -> usize {
        self.state.borrow().created
    }

    pub fn freed(&self) -> usize {
        self.state.borrow().freed
    }

    pub fn live_handles(&self) -> usize {
        self.state.borrow().jobs.len()
    }

    /// Output blocks handed out and not yet released.
    pub fn outstanding_outputs(&self) -> usize {
        self.state.borrow().live_outputs.len()
    }

    pub fn outputs(&self) -> usize {
        self.state.borrow().outputs
    }

    pub fn result_calls(&self) -> usize {
        self.state.borrow().result_calls
    }

    /// Result queries made while the job was not complete.
    pub fn early_result_calls(&self) -> usize {
        self.state.borrow().early_result_calls
    }

    pub fn abort_requests(&self) -> usize {
        self.state.borrow().abort_requests
    }

    pub fn fonts_added(&self) -> usize {
        self.state.borrow().jobs.values().map(|job| job.fonts).sum()
    }

    pub fn sends(&self) -> Vec<(DeviceModel, Vec<u8>, String)> {
        self.state.borrow().sends.clone()
    }

    /// Assert every allocation was released exactly once.
    pub fn assert_no_leaks(&self) {
        let state = self.state.borrow();
        assert_eq!(state.jobs.len(), 0, "job handles leaked");
        assert_eq!(state.created, state.freed, "handles created vs freed");
        assert!(state.live_outputs.is_empty(), "result blocks leaked");
    }

    fn with_job<T>(&self, handle: &MockHandle, f: impl FnOnce(&mut Job) -> T) -> T {
        let mut state = self.state.borrow_mut();
        let job = state
            .jobs
            .get_mut(&handle.0)
            .expect("handle used after release");
        f(job)
    }

    fn output_for(&self, handle: &MockHandle) -> MockOutput {
        let (bytes, error) = self.with_job(handle, |job| {
            if job.aborted {
                (Vec::new(), Some("Job aborted".to_string()))
            } else if let Some(error) = &job.error {
                (Vec::new(), Some(error.clone()))
            } else if job.complete {
                (self.script.output.clone(), None)
            } else {
                (Vec::new(), Some("Job not complete".to_string()))
            }
        });
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.live_outputs.insert(id);
        state.outputs += 1;
        MockOutput { id, bytes, error }
    }
}

impl PrintEngine for MockEngine {
    type Handle = MockHandle;
    type Output = MockOutput;

    fn new_job(&self, _svg: &CStr, _settings: &CStr, _model: DeviceModel) -> Option<MockHandle> {
        if self.script.null_handle {
            return None;
        }
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        state.jobs.insert(
            id,
            Job {
                error: self.script.creation_error.clone(),
                ..Job::default()
            },
        );
        state.created += 1;
        Some(MockHandle(id))
    }

    fn free_job(&self, handle: MockHandle) -> bool {
        let mut state = self.state.borrow_mut();
        assert!(state.jobs.remove(&handle.0).is_some(), "double free");
        state.freed += 1;
        true
    }

    fn add_font_data(&self, handle: &MockHandle, _data: &[u8]) -> Result<(), String> {
        if let Some(error) = &self.script.font_error {
            return Err(error.clone());
        }
        self.with_job(handle, |job| job.fonts += 1);
        Ok(())
    }

    fn run_chunk(&self, handle: &MockHandle) -> bool {
        let script = &self.script;
        self.with_job(handle, |job| {
            if job.aborted || job.complete || job.error.is_some() {
                return false;
            }
            job.chunks += 1;
            if let Some(requested) = job.abort_requested_at {
                if job.chunks - requested >= script.abort_latency {
                    job.aborted = true;
                    return false;
                }
            }
            if let Some((after, message)) = &script.fail_after {
                if job.chunks >= *after {
                    job.error = Some(message.clone());
                    return false;
                }
            }
            if job.chunks >= script.chunks_to_complete {
                job.complete = true;
                return false;
            }
            true
        })
    }

    fn run_until_complete(&self, handle: &MockHandle) -> MockOutput {
        while self.run_chunk(handle) {}
        self.output_for(handle)
    }

    fn request_abort(&self, handle: &MockHandle) -> bool {
        self.with_job(handle, |job| {
            job.abort_requested_at.get_or_insert(job.chunks);
        });
        self.state.borrow_mut().abort_requests += 1;
        true
    }

    fn progress(&self, handle: &MockHandle) -> ProgressSnapshot {
        let total = self.script.chunks_to_complete;
        self.with_job(handle, |job| ProgressSnapshot {
            progress_type: if job.error.is_some() {
                ProgressType::Error
            } else if job.complete {
                ProgressType::Finished
            } else if job.chunks == 0 {
                ProgressType::NotStarted
            } else {
                ProgressType::InProgress
            },
            stage_name: format!("chunk {}", job.chunks),
            stage_json: None,
            stage_has_progress: false,
            stage_progress: 0.0,
            stage_index: job.chunks,
            stage_count: total,
            total_progress: job.chunks as f32 / total.max(1) as f32,
        })
    }

    fn result(&self, handle: &MockHandle) -> MockOutput {
        let complete = self.with_job(handle, |job| job.complete);
        {
            let mut state = self.state.borrow_mut();
            state.result_calls += 1;
            if !complete {
                state.early_result_calls += 1;
            }
        }
        self.output_for(handle)
    }

    fn is_complete(&self, handle: &MockHandle) -> bool {
        self.with_job(handle, |job| job.complete)
    }

    fn has_error(&self, handle: &MockHandle) -> bool {
        self.with_job(handle, |job| job.error.is_some())
    }

    fn was_aborted(&self, handle: &MockHandle) -> bool {
        self.with_job(handle, |job| job.aborted)
    }

    fn error_string(&self, handle: &MockHandle) -> Option<String> {
        self.with_job(handle, |job| job.error.clone())
    }

    fn output_bytes(&self, output: &MockOutput) -> Vec<u8> {
        output.bytes.clone()
    }

    fn output_error(&self, output: &MockOutput) -> Option<String> {
        output.error.clone()
    }

    fn free_output(&self, output: MockOutput) -> bool {
        let mut state = self.state.borrow_mut();
        assert!(state.live_outputs.remove(&output.id), "output freed twice");
        true
    }

    fn send_file(&self, model: DeviceModel, data: &[u8], ip_address: &CStr) -> bool {
        self.state.borrow_mut().sends.push((
            model,
            data.to_vec(),
            ip_address.to_string_lossy().into_owned(),
        ));
        self.script.send_succeeds
    }

    fn api_version(&self) -> Option<String> {
        Some("1.4.2".to_string())
    }
}
