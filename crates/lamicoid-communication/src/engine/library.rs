//! Epilog print API loaded from its shared library.

use std::ffi::{c_char, CStr, OsStr};
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use lamicoid_core::{DeviceModel, EngineError};
use libloading::Library;

use super::ffi::{
    self, AddFontDataFn, ApiVersionFn, CApiResult, ErrorStringFn, FlagFn, FreeApiErrorFn,
    FreeApiResultFn, FreeCStringFn, FreePrnGenFn, FreeProgressReportFn, GetProgressFn,
    GetResultFn, PrnGen, PrnGenNewFn, RequestAbortFn, RunChunkFn, RunUntilCompleteFn,
    SendFileFn,
};
use super::{PrintEngine, ProgressSnapshot, ProgressType};

#[cfg(target_os = "windows")]
const LIBRARY_NAMES: &[&str] = &["epilog_print_api_libcpp.dll"];
#[cfg(target_os = "macos")]
const LIBRARY_NAMES: &[&str] = &["libepilog-print-api.dylib"];
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const LIBRARY_NAMES: &[&str] = &["libepilog-print-api.so"];

/// A live `PrnGen` pointer.
///
/// Not `Send`: the engine does not document thread safety for a generator.
#[derive(Debug)]
pub struct EpilogHandle(NonNull<PrnGen>);

/// A `CApiResult` awaiting `free_c_api_result`.
#[derive(Debug)]
pub struct EpilogOutput(CApiResult);

/// The Epilog engine resolved from a loaded library.
pub struct EpilogEngine {
    prn_gen_new: PrnGenNewFn,
    free_prn_gen: FreePrnGenFn,
    add_font_data: AddFontDataFn,
    run_chunk: RunChunkFn,
    run_until_complete: RunUntilCompleteFn,
    request_abort: RequestAbortFn,
    get_progress: GetProgressFn,
    get_result: GetResultFn,
    is_complete: FlagFn,
    has_error: FlagFn,
    was_aborted: FlagFn,
    error_string: ErrorStringFn,
    send_file: SendFileFn,
    free_c_api_result: FreeApiResultFn,
    free_c_api_error: FreeApiErrorFn,
    free_c_progress_report: FreeProgressReportFn,
    free_cstring: FreeCStringFn,
    api_version: ApiVersionFn,
    path: PathBuf,
    // Must outlive every function pointer above.
    _library: Library,
}

impl std::fmt::Debug for EpilogEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpilogEngine")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Platform library file names tried by [`EpilogEngine::load`].
pub fn default_library_names() -> &'static [&'static str] {
    LIBRARY_NAMES
}

/// Candidate locations for the engine library, most specific first.
///
/// The directory of the running executable is searched before the system
/// loader's own search path.
pub fn library_candidates() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    let mut candidates = Vec::new();
    for name in LIBRARY_NAMES {
        if let Some(dir) = &exe_dir {
            candidates.push(dir.join(name));
        }
        candidates.push(PathBuf::from(name));
    }
    candidates
}

unsafe fn symbol<T: Copy>(library: &Library, name: &str) -> Result<T, EngineError> {
    let mut bytes = name.as_bytes().to_vec();
    bytes.push(0);
    library
        .get::<T>(&bytes)
        .map(|sym| *sym)
        .map_err(|e| EngineError::MissingSymbol {
            symbol: name.to_string(),
            reason: e.to_string(),
        })
}

/// Copy a NUL-terminated engine string. Null and empty both read as `None`.
unsafe fn read_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let text = CStr::from_ptr(ptr).to_string_lossy().into_owned();
    (!text.is_empty()).then_some(text)
}

impl EpilogEngine {
    /// Load the engine from the first default location that opens.
    pub fn load() -> Result<Self, EngineError> {
        let mut last_error = None;
        for candidate in library_candidates() {
            match Self::load_from(&candidate) {
                Ok(engine) => return Ok(engine),
                Err(e) => {
                    tracing::debug!("Engine library not usable at {:?}: {}", candidate, e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| EngineError::LibraryLoad {
            path: LIBRARY_NAMES.join(", "),
            reason: "no candidate library names".to_string(),
        }))
    }

    /// Load the engine from an explicit path or library name.
    pub fn load_from(path: impl AsRef<OsStr>) -> Result<Self, EngineError> {
        let path = PathBuf::from(path.as_ref());
        // SAFETY: loading runs the library's initialisers; the Epilog library
        // has none with preconditions.
        let library = unsafe { Library::new(&path) }.map_err(|e| EngineError::LibraryLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        // SAFETY: each type matches the prototype in epilog-print-api.h.
        let engine = unsafe {
            Self {
                prn_gen_new: symbol(&library, "prn_gen_new")?,
                free_prn_gen: symbol(&library, "free_prn_gen")?,
                add_font_data: symbol(&library, "prn_gen_add_font_data")?,
                run_chunk: symbol(&library, "prn_gen_run_chunk")?,
                run_until_complete: symbol(&library, "prn_gen_run_until_complete")?,
                request_abort: symbol(&library, "prn_gen_request_abort")?,
                get_progress: symbol(&library, "prn_gen_get_progress")?,
                get_result: symbol(&library, "prn_gen_get_result")?,
                is_complete: symbol(&library, "prn_gen_is_complete")?,
                has_error: symbol(&library, "prn_gen_has_error")?,
                was_aborted: symbol(&library, "prn_gen_was_aborted")?,
                error_string: symbol(&library, "prn_gen_error_string")?,
                send_file: symbol(&library, "prn_gen_send_file")?,
                free_c_api_result: symbol(&library, "free_c_api_result")?,
                free_c_api_error: symbol(&library, "free_c_api_error")?,
                free_c_progress_report: symbol(&library, "free_c_progress_report")?,
                free_cstring: symbol(&library, "free_cstring")?,
                api_version: symbol(&library, "api_version")?,
                path,
                _library: library,
            }
        };

        tracing::info!("Loaded Epilog print engine from {:?}", engine.path);
        Ok(engine)
    }

    /// Load from `path` when given, otherwise search the default locations.
    pub fn load_with_override(path: Option<&Path>) -> Result<Self, EngineError> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// SAFETY for every call below: handles and outputs are only created by this
// engine and are consumed when released, so each pointer passed in is live.
impl PrintEngine for EpilogEngine {
    type Handle = EpilogHandle;
    type Output = EpilogOutput;

    fn new_job(&self, svg: &CStr, settings: &CStr, model: DeviceModel) -> Option<EpilogHandle> {
        let raw = unsafe { (self.prn_gen_new)(svg.as_ptr(), settings.as_ptr(), model.as_raw()) };
        NonNull::new(raw).map(EpilogHandle)
    }

    fn free_job(&self, handle: EpilogHandle) -> bool {
        unsafe { (self.free_prn_gen)(handle.0.as_ptr()) }
    }

    fn add_font_data(&self, handle: &EpilogHandle, data: &[u8]) -> Result<(), String> {
        let status = unsafe {
            (self.add_font_data)(handle.0.as_ptr(), data.as_ptr().cast(), data.len())
        };
        let message = unsafe { read_c_str(status.error) };
        unsafe { (self.free_c_api_error)(&status) };
        match message {
            Some(message) => Err(message),
            None => Ok(()),
        }
    }

    fn run_chunk(&self, handle: &EpilogHandle) -> bool {
        unsafe { (self.run_chunk)(handle.0.as_ptr()) }
    }

    fn run_until_complete(&self, handle: &EpilogHandle) -> EpilogOutput {
        EpilogOutput(unsafe { (self.run_until_complete)(handle.0.as_ptr()) })
    }

    fn request_abort(&self, handle: &EpilogHandle) -> bool {
        unsafe { (self.request_abort)(handle.0.as_ptr()) }
    }

    fn progress(&self, handle: &EpilogHandle) -> ProgressSnapshot {
        let report = unsafe { (self.get_progress)(handle.0.as_ptr()) };
        let progress_type = match report.progress_type {
            ffi::PROGRESS_NOT_STARTED => ProgressType::NotStarted,
            ffi::PROGRESS_IN_PROGRESS => ProgressType::InProgress,
            ffi::PROGRESS_FINISHED => ProgressType::Finished,
            ffi::PROGRESS_ERROR => ProgressType::Error,
            other => {
                tracing::warn!("Unknown engine progress type {}", other);
                ProgressType::Error
            }
        };
        let snapshot = ProgressSnapshot {
            progress_type,
            stage_name: unsafe { read_c_str(report.stage_name) }.unwrap_or_default(),
            stage_json: unsafe { read_c_str(report.stage_json) },
            stage_has_progress: report.stage_has_progress,
            stage_progress: report.stage_progress,
            stage_index: report.stage_index,
            stage_count: report.stage_count,
            total_progress: report.total_progress,
        };
        unsafe { (self.free_c_progress_report)(&report) };
        snapshot
    }

    fn result(&self, handle: &EpilogHandle) -> EpilogOutput {
        EpilogOutput(unsafe { (self.get_result)(handle.0.as_ptr()) })
    }

    fn is_complete(&self, handle: &EpilogHandle) -> bool {
        unsafe { (self.is_complete)(handle.0.as_ptr()) }
    }

    fn has_error(&self, handle: &EpilogHandle) -> bool {
        unsafe { (self.has_error)(handle.0.as_ptr()) }
    }

    fn was_aborted(&self, handle: &EpilogHandle) -> bool {
        unsafe { (self.was_aborted)(handle.0.as_ptr()) }
    }

    fn error_string(&self, handle: &EpilogHandle) -> Option<String> {
        // Owned by the generator; copied, not freed.
        unsafe { read_c_str((self.error_string)(handle.0.as_ptr())) }
    }

    fn output_bytes(&self, output: &EpilogOutput) -> Vec<u8> {
        let result = &output.0;
        if result.result.is_null() || result.result_size == 0 {
            return Vec::new();
        }
        unsafe { std::slice::from_raw_parts(result.result.cast::<u8>(), result.result_size) }
            .to_vec()
    }

    fn output_error(&self, output: &EpilogOutput) -> Option<String> {
        unsafe { read_c_str(output.0.error) }
    }

    fn free_output(&self, output: EpilogOutput) -> bool {
        unsafe { (self.free_c_api_result)(&output.0) }
    }

    fn send_file(&self, model: DeviceModel, data: &[u8], ip_address: &CStr) -> bool {
        unsafe {
            (self.send_file)(
                model.as_raw(),
                data.as_ptr().cast(),
                data.len(),
                ip_address.as_ptr(),
            )
        }
    }

    fn api_version(&self) -> Option<String> {
        let raw = unsafe { (self.api_version)() };
        if raw.is_null() {
            return None;
        }
        let version = unsafe { read_c_str(raw) };
        unsafe { (self.free_cstring)(raw.cast_mut()) };
        version
    }
}
