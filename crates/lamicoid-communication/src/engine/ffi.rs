//! C layout of the Epilog print API.
//!
//! Mirrors `epilog-print-api.h`. Every pointer handed out by the library is
//! released through its matching `free_*` function.

use std::ffi::{c_char, c_int};

/// Opaque print file generator.
#[repr(C)]
pub struct PrnGen {
    _private: [u8; 0],
}

/// `ProgressType` discriminants.
pub const PROGRESS_NOT_STARTED: c_int = 0;
pub const PROGRESS_IN_PROGRESS: c_int = 1;
pub const PROGRESS_FINISHED: c_int = 2;
pub const PROGRESS_ERROR: c_int = 3;

#[repr(C)]
#[derive(Debug)]
pub struct CProgressReport {
    pub progress_type: c_int,
    pub stage_name: *const c_char,
    pub stage_json: *const c_char,
    pub stage_has_progress: bool,
    pub stage_progress: f32,
    pub stage_index: usize,
    pub stage_count: usize,
    pub total_progress: f32,
}

#[repr(C)]
#[derive(Debug)]
pub struct CApiError {
    pub error: *const c_char,
}

#[repr(C)]
#[derive(Debug)]
pub struct CApiResult {
    pub result: *const c_char,
    pub result_size: usize,
    pub error: *const c_char,
}

pub type PrnGenNewFn =
    unsafe extern "C" fn(svg: *const c_char, settings: *const c_char, machine: c_int) -> *mut PrnGen;
pub type FreePrnGenFn = unsafe extern "C" fn(generator: *mut PrnGen) -> bool;
pub type AddFontDataFn =
    unsafe extern "C" fn(generator: *mut PrnGen, data: *const c_char, len: usize) -> CApiError;
pub type RunChunkFn = unsafe extern "C" fn(generator: *mut PrnGen) -> bool;
pub type RunUntilCompleteFn = unsafe extern "C" fn(generator: *mut PrnGen) -> CApiResult;
pub type RequestAbortFn = unsafe extern "C" fn(generator: *mut PrnGen) -> bool;
pub type GetProgressFn = unsafe extern "C" fn(generator: *const PrnGen) -> CProgressReport;
pub type GetResultFn = unsafe extern "C" fn(generator: *const PrnGen) -> CApiResult;
pub type FlagFn = unsafe extern "C" fn(generator: *const PrnGen) -> bool;
pub type ErrorStringFn = unsafe extern "C" fn(generator: *const PrnGen) -> *const c_char;
pub type SendFileFn = unsafe extern "C" fn(
    machine: c_int,
    data: *const c_char,
    len: usize,
    ip_address: *const c_char,
) -> bool;
pub type FreeApiResultFn = unsafe extern "C" fn(result: *const CApiResult) -> bool;
pub type FreeApiErrorFn = unsafe extern "C" fn(error: *const CApiError) -> bool;
pub type FreeProgressReportFn = unsafe extern "C" fn(report: *const CProgressReport) -> bool;
pub type FreeCStringFn = unsafe extern "C" fn(s: *mut c_char) -> bool;
pub type ApiVersionFn = unsafe extern "C" fn() -> *const c_char;
