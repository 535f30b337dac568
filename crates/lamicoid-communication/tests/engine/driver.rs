use std::time::Duration;

use lamicoid_communication::{JobDriver, JobState, ProgressType};
use lamicoid_core::{DeviceModel, EngineError};

use crate::common::{MockEngine, Script};

const SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>";
const SETTINGS: &str = "{\"job_name\":\"test\"}";

fn driver(script: Script) -> JobDriver<MockEngine> {
    JobDriver::new(MockEngine::new(script))
}

#[test]
fn test_chunked_run_completes() {
    let driver = driver(Script::default());
    let mut job = driver.create(SVG, SETTINGS, DeviceModel::Fusion32).unwrap();
    assert_eq!(job.state(), JobState::Created);
    assert_eq!(job.poll_progress().progress_type, ProgressType::NotStarted);

    let mut chunks = 0;
    while job.run_chunk().unwrap() {
        chunks += 1;
        assert_eq!(job.state(), JobState::Running);
    }
    assert_eq!(chunks, 2);
    assert_eq!(job.chunks_run(), 3);
    assert_eq!(job.state(), JobState::Completed);
    assert!(job.is_complete());
    assert!(!job.has_error());

    let result = job.get_result().unwrap();
    assert_eq!(result.bytes, b"PRN");
    assert!(result.is_success());

    // settled jobs do not run again
    assert!(!job.run_chunk().unwrap());
    assert_eq!(job.chunks_run(), 3);

    job.destroy();
    driver.engine().assert_no_leaks();
}

#[test]
fn test_blocking_run_returns_bytes() {
    let driver = driver(Script::default());
    let mut job = driver.create(SVG, SETTINGS, DeviceModel::Edge24).unwrap();
    let result = job.run_to_completion().unwrap();
    assert_eq!(result.into_bytes().unwrap(), b"PRN");
    assert_eq!(job.state(), JobState::Completed);

    // a second blocking run is refused
    assert_eq!(
        job.run_to_completion(),
        Err(EngineError::AlreadyFinished {
            state: "Completed".to_string()
        })
    );
    drop(job);
    driver.engine().assert_no_leaks();
}

#[test]
fn test_creation_error_releases_handle() {
    let driver = driver(Script {
        creation_error: Some("Invalid settings JSON".to_string()),
        ..Script::default()
    });

    let err = driver
        .create(SVG, SETTINGS, DeviceModel::Fusion40)
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Creation {
            message: "Invalid settings JSON".to_string()
        }
    );
    assert_eq!(driver.engine().created(), 1);
    assert_eq!(driver.engine().freed(), 1);
    driver.engine().assert_no_leaks();
}

#[test]
fn test_null_handle_is_creation_error() {
    let driver = driver(Script {
        null_handle: true,
        ..Script::default()
    });
    let err = driver.create(SVG, SETTINGS, DeviceModel::Mini24).unwrap_err();
    assert!(matches!(err, EngineError::Creation { .. }));
    assert_eq!(driver.engine().created(), 0);
}

#[test]
fn test_nul_in_input_rejected_before_engine() {
    let driver = driver(Script::default());
    let err = driver
        .create("<svg>\0</svg>", SETTINGS, DeviceModel::Zing16)
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidArgument { argument: "svg" });
    assert_eq!(driver.engine().created(), 0);
}

#[test]
fn test_abort_mid_run() {
    let driver = driver(Script {
        chunks_to_complete: 10,
        abort_latency: 2,
        ..Script::default()
    });
    let mut job = driver.create(SVG, SETTINGS, DeviceModel::Pro24).unwrap();

    assert!(job.run_chunk().unwrap());
    assert!(job.run_chunk().unwrap());
    assert!(job.request_abort());
    // the abort is observed on a later chunk, not immediately
    assert!(!job.was_aborted());
    assert_eq!(job.state(), JobState::Running);

    let mut guard = 0;
    while job.run_chunk().unwrap() {
        guard += 1;
        assert!(guard < 10);
    }

    assert!(job.was_aborted());
    assert!(!job.is_complete());
    assert_eq!(job.state(), JobState::Aborted);
    assert_eq!(job.get_result(), Err(EngineError::NotComplete));
    assert!(!job.request_abort());

    job.destroy();
    assert_eq!(driver.engine().early_result_calls(), 0);
    assert_eq!(driver.engine().abort_requests(), 1);
    driver.engine().assert_no_leaks();
}

#[test]
fn test_result_never_requested_early() {
    let driver = driver(Script {
        chunks_to_complete: 5,
        ..Script::default()
    });
    let mut job = driver.create(SVG, SETTINGS, DeviceModel::G2).unwrap();

    assert_eq!(job.get_result(), Err(EngineError::NotComplete));
    job.run_chunk().unwrap();
    assert_eq!(job.get_result(), Err(EngineError::NotComplete));
    assert_eq!(driver.engine().result_calls(), 0);
    assert_eq!(driver.engine().outputs(), 0);
}

#[test]
fn test_mixed_execution_refused() {
    let driver = driver(Script::default());

    let mut chunked = driver.create(SVG, SETTINGS, DeviceModel::Pro32).unwrap();
    chunked.run_chunk().unwrap();
    assert_eq!(
        chunked.run_to_completion(),
        Err(EngineError::MixedExecution {
            current: "chunked",
            requested: "run to completion"
        })
    );

    let mut blocking = driver.create(SVG, SETTINGS, DeviceModel::Pro32).unwrap();
    blocking.run_to_completion().unwrap();
    assert!(matches!(
        blocking.run_chunk(),
        Err(EngineError::MixedExecution {
            current: "blocking",
            ..
        })
    ));

    drop(chunked);
    drop(blocking);
    driver.engine().assert_no_leaks();
}

#[test]
fn test_engine_error_is_verbatim() {
    let message = "Stage 'vectorize' failed: path 3 is not closed";
    let driver = driver(Script {
        fail_after: Some((2, message.to_string())),
        ..Script::default()
    });

    let mut job = driver.create(SVG, SETTINGS, DeviceModel::Fusion32M2).unwrap();
    let result = job.run_to_completion().unwrap();
    assert_eq!(job.state(), JobState::Failed);
    assert!(job.has_error());
    assert_eq!(job.error_string().as_deref(), Some(message));
    assert_eq!(result.error.as_deref(), Some(message));
    assert_eq!(
        result.into_bytes().unwrap_err().to_string(),
        message.to_string()
    );
    job.destroy();
    driver.engine().assert_no_leaks();
}

#[test]
fn test_generate_supplies_fonts_and_releases() {
    let driver = driver(Script::default());
    let fonts = vec![vec![0u8; 16], vec![1u8; 8]];
    let bytes = driver
        .generate(SVG, SETTINGS, DeviceModel::Fibermark24, &fonts)
        .unwrap();
    assert_eq!(bytes, b"PRN");
    driver.engine().assert_no_leaks();
}

#[test]
fn test_font_rejection_releases_handle() {
    let driver = driver(Script {
        font_error: Some("Unsupported font format".to_string()),
        ..Script::default()
    });
    let err = driver
        .generate(SVG, SETTINGS, DeviceModel::Helix24, &[vec![0u8; 4]])
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::FontData {
            message: "Unsupported font format".to_string()
        }
    );
    driver.engine().assert_no_leaks();
}

#[test]
fn test_fonts_only_before_execution() {
    let driver = driver(Script::default());
    let mut job = driver.create(SVG, SETTINGS, DeviceModel::Ext36).unwrap();
    job.add_font_data(&[1, 2, 3]).unwrap();
    assert_eq!(driver.engine().fonts_added(), 1);
    job.run_chunk().unwrap();
    assert!(matches!(
        job.add_font_data(&[1, 2, 3]),
        Err(EngineError::AlreadyFinished { .. })
    ));
}

#[test]
fn test_deadline_reports_progress() {
    let driver = driver(Script {
        chunks_to_complete: 4,
        ..Script::default()
    });
    let job = driver.create(SVG, SETTINGS, DeviceModel::Maker24).unwrap();

    let mut seen = Vec::new();
    let result = job
        .run_with_deadline(Duration::from_secs(30), |progress| {
            seen.push(progress.stage_index)
        })
        .unwrap();

    assert_eq!(result.bytes, b"PRN");
    assert_eq!(seen, vec![1, 2, 3]);
    driver.engine().assert_no_leaks();
}

#[test]
fn test_deadline_timeout_aborts_and_releases() {
    let driver = driver(Script {
        chunks_to_complete: usize::MAX,
        ..Script::default()
    });
    let job = driver.create(SVG, SETTINGS, DeviceModel::Maker12).unwrap();

    let err = job.run_with_deadline(Duration::ZERO, |_| {}).unwrap_err();
    assert_eq!(err, EngineError::Timeout { timeout_ms: 0 });
    assert_eq!(driver.engine().abort_requests(), 1);
    driver.engine().assert_no_leaks();
}

#[test]
fn test_deadline_checked_between_chunks_only() {
    // the first chunk finishes the job, so the expired deadline is never consulted
    let driver = driver(Script {
        chunks_to_complete: 1,
        ..Script::default()
    });
    let job = driver.create(SVG, SETTINGS, DeviceModel::Maker12).unwrap();

    let mut updates = 0;
    let result = job
        .run_with_deadline(Duration::ZERO, |_| updates += 1)
        .unwrap();
    assert_eq!(result.bytes, b"PRN");
    assert_eq!(updates, 0);
    assert_eq!(driver.engine().abort_requests(), 0);

    // one chunk with more work left runs to its end before the timeout fires
    let driver = self::driver(Script {
        chunks_to_complete: 2,
        ..Script::default()
    });
    let job = driver.create(SVG, SETTINGS, DeviceModel::Maker12).unwrap();
    let mut updates = 0;
    let err = job
        .run_with_deadline(Duration::ZERO, |_| updates += 1)
        .unwrap_err();
    assert_eq!(err, EngineError::Timeout { timeout_ms: 0 });
    assert_eq!(updates, 1);
    driver.engine().assert_no_leaks();
}

#[tokio::test]
async fn test_cooperative_run_completes() {
    let driver = driver(Script {
        chunks_to_complete: 6,
        ..Script::default()
    });
    let job = driver.create(SVG, SETTINGS, DeviceModel::Zing24).unwrap();

    let mut updates = 0;
    let result = job
        .run_cooperative(Duration::from_secs(30), |_| updates += 1)
        .await
        .unwrap();

    assert_eq!(result.bytes, b"PRN");
    assert_eq!(updates, 5);
    driver.engine().assert_no_leaks();
}

#[tokio::test]
async fn test_cooperative_run_times_out() {
    let driver = driver(Script {
        chunks_to_complete: usize::MAX,
        ..Script::default()
    });
    let job = driver.create(SVG, SETTINGS, DeviceModel::G100_4x4).unwrap();

    let err = job
        .run_cooperative(Duration::from_millis(10), |_| {})
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Timeout { timeout_ms: 10 });
    driver.engine().assert_no_leaks();
}

#[test]
fn test_api_version() {
    assert_eq!(
        driver(Script::default()).api_version().as_deref(),
        Some("1.4.2")
    );
}
