//! Executor tests against the simulated instrument
//!
//! These tests drive a [`CachedExecutor`] over a [`SimulatedScope`] and use the
//! scope's transfer log to count physical transfers and check their spacing.
//!
//! ## Note on Serial Execution
//!
//! Timing-sensitive tests use #[serial] so that parallel test threads do not
//! stretch the intervals being measured.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hdsctl_link::{
    CachedExecutor, ExecError, Executor, ExecutorConfig, LinkError, SimFault, SimMonitor,
    SimulatedScope,
};
use hdsctl_scpi::{hds_catalog, Catalog};
use serial_test::serial;

// ============================================================================
// Helpers
// ============================================================================

fn connect(config: ExecutorConfig) -> (CachedExecutor<SimulatedScope>, SimMonitor, Catalog) {
    let scope = SimulatedScope::new();
    let monitor = scope.monitor();
    let executor = CachedExecutor::connect(scope, config).expect("connect");
    (executor, monitor, hds_catalog().expect("catalog"))
}

fn run(executor: &CachedExecutor<SimulatedScope>, catalog: &Catalog, line: &str) -> Result<Option<String>, ExecError> {
    let request = catalog.parse(line).expect("parse");
    executor
        .execute(&request)
        .map(|value| value.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
}

// ============================================================================
// Identity gate
// ============================================================================

#[test]
fn test_connect_checks_identity() {
    let (executor, monitor, _) = connect(ExecutorConfig::default());
    assert!(executor.identity().starts_with("OWON,HDS2"));
    assert_eq!(monitor.writes()[0].command, "*IDN?");
}

#[test]
fn test_connect_rejects_other_instrument() {
    let scope = SimulatedScope::new().with_identity("RIGOL TECHNOLOGIES,DS1054Z");
    let err = CachedExecutor::connect(scope, ExecutorConfig::default()).err();
    assert_eq!(
        err,
        Some(ExecError::UnsupportedDevice("RIGOL TECHNOLOGIES,DS1054Z".to_string()))
    );
}

#[test]
fn test_identity_prefix_is_case_insensitive() {
    let scope = SimulatedScope::new().with_identity("owon,hds2202s,1,1");
    assert!(CachedExecutor::connect(scope, ExecutorConfig::default()).is_ok());
}

// ============================================================================
// Cache
// ============================================================================

#[test]
fn test_repeated_query_uses_one_transfer() {
    let (executor, monitor, catalog) = connect(ExecutorConfig::default());
    let before = monitor.write_count();

    let first = run(&executor, &catalog, ":CH1:DISP?").unwrap();
    let second = run(&executor, &catalog, ":CH1:DISPlay?").unwrap();

    assert_eq!(first.as_deref(), Some("ON"));
    assert_eq!(first, second);
    assert_eq!(monitor.write_count(), before + 1);
}

#[test]
fn test_expired_entry_is_refetched() {
    let config = ExecutorConfig::default().with_cache_ttl(Duration::from_millis(100));
    let (executor, monitor, catalog) = connect(config);
    let before = monitor.write_count();

    run(&executor, &catalog, ":ACQ:MOD?").unwrap();
    monitor.set_value(":ACQuire:MODe", "PEAK");
    assert_eq!(run(&executor, &catalog, ":ACQ:MOD?").unwrap().as_deref(), Some("SAMPle"));

    thread::sleep(Duration::from_millis(150));
    assert_eq!(run(&executor, &catalog, ":ACQ:MOD?").unwrap().as_deref(), Some("PEAK"));
    assert_eq!(monitor.write_count(), before + 2);
}

#[test]
fn test_set_then_query_reads_new_value() {
    let (executor, monitor, catalog) = connect(ExecutorConfig::default());

    assert_eq!(run(&executor, &catalog, ":CH1:DISP?").unwrap().as_deref(), Some("ON"));
    assert_eq!(run(&executor, &catalog, ":CH1:DISP OFF").unwrap(), None);
    assert_eq!(run(&executor, &catalog, ":CH1:DISP?").unwrap().as_deref(), Some("OFF"));

    let commands: Vec<String> = monitor.writes().into_iter().map(|w| w.command).collect();
    assert_eq!(
        &commands[1..],
        &[":CH1:DISPlay?", ":CH1:DISPlay OFF", ":CH1:DISPlay?"]
    );
}

#[test]
fn test_set_keeps_superseded_entry() {
    let (executor, _, catalog) = connect(ExecutorConfig::default());
    run(&executor, &catalog, ":CH2:COUP?").unwrap();
    run(&executor, &catalog, ":CH2:COUP AC").unwrap();

    let entry = executor.cached(":CH2:COUPling").expect("entry kept");
    assert!(entry.is_superseded());
}

// ============================================================================
// Throttle
// ============================================================================

#[test]
#[serial]
fn test_transfers_are_spaced() {
    let interval = Duration::from_millis(30);
    let config = ExecutorConfig::default().with_min_interval(interval);
    let (executor, monitor, catalog) = connect(config);

    run(&executor, &catalog, ":FUNC:FREQ 1000").unwrap();
    run(&executor, &catalog, ":FUNC:FREQ 2000").unwrap();
    run(&executor, &catalog, ":FUNC:FREQ?").unwrap();

    let writes = monitor.writes();
    assert_eq!(writes.len(), 4);
    for pair in writes.windows(2) {
        let gap = pair[1].at.duration_since(pair[0].at);
        assert!(gap >= interval, "gap {:?} shorter than {:?}", gap, interval);
    }
}

#[test]
#[serial]
fn test_cache_hit_skips_throttle() {
    let config = ExecutorConfig::default().with_min_interval(Duration::from_millis(200));
    let (executor, _, catalog) = connect(config);
    run(&executor, &catalog, ":CH1:PROB?").unwrap();

    let start = std::time::Instant::now();
    run(&executor, &catalog, ":CH1:PROB?").unwrap();
    assert!(start.elapsed() < Duration::from_millis(100));
}

#[test]
#[serial]
fn test_concurrent_callers_are_serialized() {
    const THREADS: usize = 4;
    const OPS: usize = 5;
    let interval = Duration::from_millis(20);
    let config = ExecutorConfig::default()
        .with_min_interval(interval)
        .with_cache_ttl(Duration::ZERO);
    let (executor, monitor, catalog) = connect(config);
    let executor = Arc::new(executor);
    let catalog = Arc::new(catalog);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let executor = Arc::clone(&executor);
            let catalog = Arc::clone(&catalog);
            thread::spawn(move || {
                for op in 0..OPS {
                    if op % 2 == 0 {
                        let line = format!(":FUNC:FREQ {}", 1000 * (t + 1) + op);
                        assert_eq!(run(&executor, &catalog, &line).unwrap(), None);
                    } else {
                        assert!(run(&executor, &catalog, ":FUNC:FREQ?").unwrap().is_some());
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let writes = monitor.writes();
    // Every set reaches the link; queries may only be absorbed by an entry
    // captured in the very same instant.
    let sets = THREADS * ((OPS + 1) / 2);
    assert!(writes.len() > sets, "only {} transfers", writes.len());
    assert!(writes.len() <= 1 + THREADS * OPS);
    for pair in writes.windows(2) {
        let gap = pair[1].at.duration_since(pair[0].at);
        assert!(gap >= interval, "gap {:?} shorter than {:?}", gap, interval);
    }
}

// ============================================================================
// Transfer failures
// ============================================================================

#[test]
fn test_truncated_bulk_read_rejected() {
    let (executor, monitor, catalog) = connect(ExecutorConfig::default());
    monitor.inject_fault(SimFault::TruncatedRead);

    let err = run(&executor, &catalog, ":DAT:WAV:SCR:CH1?").unwrap_err();
    assert_eq!(
        err,
        ExecError::UnexpectedResponseLength {
            length: 10,
            command: ":DATa:WAVe:SCReen:CH1?".to_string(),
        }
    );
    assert!(executor.cached(":DATa:WAVe:SCReen:CH1").is_none());

    // The next read succeeds.
    let wave = run(&executor, &catalog, ":DAT:WAV:SCR:CH1?").unwrap().unwrap();
    assert!(wave.len() >= 100);
}

#[test]
fn test_short_write_surfaces() {
    let (executor, monitor, catalog) = connect(ExecutorConfig::default());
    monitor.inject_fault(SimFault::ShortWrite);

    let err = run(&executor, &catalog, ":CH1:DISP OFF").unwrap_err();
    let expected = ":CH1:DISPlay OFF".len();
    assert_eq!(
        err,
        ExecError::ShortWrite {
            written: expected / 2,
            expected,
        }
    );
}

#[test]
fn test_timeout_surfaces() {
    let (executor, monitor, catalog) = connect(ExecutorConfig::default());
    monitor.inject_fault(SimFault::Timeout);

    let err = run(&executor, &catalog, ":TRIG:STAT?").unwrap_err();
    assert_eq!(err, ExecError::Link(LinkError::Timeout));
    assert!(executor.cached(":TRIGger:STATus").is_none());
}

// ============================================================================
// Status block
// ============================================================================

#[test]
fn test_status_head_warms_cache() {
    let (executor, monitor, catalog) = connect(ExecutorConfig::default());
    monitor.set_value(":CH2:OFFSet", "1.5");

    let block = run(&executor, &catalog, ":DAT:WAV:SCR:HEAD?").unwrap().unwrap();
    assert!(block.starts_with('{'), "framing prefix not stripped: {:?}", &block[..8]);

    let paths = [
        ":HORizontal:SCALe",
        ":HORizontal:OFFSet",
        ":ACQuire:MODe",
        ":ACQuire:DEPMem",
        ":CH1:DISPlay",
        ":CH2:OFFSet",
        ":TRIGger:SINGle:SWEep",
    ];
    let stamp = executor.cached(paths[0]).unwrap().captured_at;
    for path in paths {
        let entry = executor.cached(path).unwrap_or_else(|| panic!("{} not cached", path));
        assert_eq!(entry.captured_at, stamp, "{}", path);
    }
    assert_eq!(&executor.cached(":CH2:OFFSet").unwrap().value[..], b"1.50");

    let before = monitor.write_count();
    assert_eq!(run(&executor, &catalog, ":CH1:COUP?").unwrap().as_deref(), Some("AC"));
    assert_eq!(monitor.write_count(), before);
}

#[test]
fn test_cached_status_head_is_stripped() {
    let (executor, _, catalog) = connect(ExecutorConfig::default());
    let first = run(&executor, &catalog, ":DAT:WAV:SCR:HEAD?").unwrap();
    let second = run(&executor, &catalog, ":DAT:WAV:SCR:HEAD?").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_malformed_status_block_keeps_warm_entries() {
    let config = ExecutorConfig::default().with_cache_ttl(Duration::ZERO);
    let (executor, monitor, catalog) = connect(config);
    run(&executor, &catalog, ":DAT:WAV:SCR:HEAD?").unwrap();
    let display = executor.cached(":CH1:DISPlay").expect("warmed");
    let scale = executor.cached(":HORizontal:SCALe").expect("warmed");

    monitor.set_value(":CH1:DISPlay", "OFF");
    monitor.inject_fault(SimFault::MalformedStatus);
    let before = monitor.write_count();
    assert!(run(&executor, &catalog, ":DAT:WAV:SCR:HEAD?").unwrap().is_some());
    assert_eq!(monitor.write_count(), before + 1);

    assert_eq!(executor.cached(":CH1:DISPlay"), Some(display));
    assert_eq!(executor.cached(":HORizontal:SCALe"), Some(scale));
}

#[test]
fn test_malformed_status_block_leaves_cache() {
    let (executor, monitor, catalog) = connect(ExecutorConfig::default());
    monitor.inject_fault(SimFault::MalformedStatus);

    let block = run(&executor, &catalog, ":DAT:WAV:SCR:HEAD?").unwrap();
    assert!(block.is_some());
    assert!(executor.cached(":HORizontal:SCALe").is_none());
    assert!(executor.cached(":CH1:DISPlay").is_none());
}
