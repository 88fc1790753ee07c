//! Script execution tests
//!
//! Scripts run against the simulated instrument. Query output is captured in
//! a buffer; the scope monitor shows which commands reached the link.

use hdsctl_link::{CachedExecutor, ExecError, ExecutorConfig, LinkError, SimFault, SimMonitor, SimulatedScope};
use hdsctl_runner::{Instrument, RunnerError};
use hdsctl_scpi::{hds_catalog, ScpiError};

fn instrument() -> (Instrument, SimMonitor) {
    let scope = SimulatedScope::new();
    let monitor = scope.monitor();
    let executor = CachedExecutor::connect(scope, ExecutorConfig::default()).expect("connect");
    (Instrument::new(hds_catalog().expect("catalog"), executor), monitor)
}

fn run_script(instrument: &Instrument, script: &str) -> (Result<(), RunnerError>, String) {
    let mut out = Vec::new();
    let result = instrument.execute_script(script, &mut out);
    (result, String::from_utf8(out).expect("utf-8 output"))
}

#[test]
fn test_script_prints_queries() {
    let (instrument, monitor) = instrument();
    let script = "\n:CH1:DISP OFF; :CH1:DISP?\n\n  :FUNC:FREQ 200 ;:FUNC:FREQ?\n";

    let (result, out) = run_script(&instrument, script);
    result.unwrap();
    assert_eq!(out, "OFF\n200\n");
    assert_eq!(monitor.value(":FUNCtion:FREQuency").as_deref(), Some("200"));
}

#[test]
fn test_script_aborts_on_unknown_command() {
    let (instrument, monitor) = instrument();
    let (result, out) = run_script(&instrument, ":CH1:DISP OFF; :BOGUS 1; :CH2:DISP ON");

    match result {
        Err(RunnerError::Command { command, source }) => {
            assert_eq!(command, ":BOGUS 1");
            assert!(matches!(*source, RunnerError::Scpi(ScpiError::UnknownCommand(ref head)) if head == ":BOGUS"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(out.is_empty());
    assert_eq!(monitor.value(":CH1:DISPlay").as_deref(), Some("OFF"));
    assert_eq!(monitor.value(":CH2:DISPlay").as_deref(), Some("OFF"));
}

#[test]
fn test_script_rejects_query_arguments() {
    let (instrument, _) = instrument();
    let (result, _) = run_script(&instrument, ":CH1:DISP? ON");
    match result {
        Err(RunnerError::Command { command, source }) => {
            assert_eq!(command, ":CH1:DISP? ON");
            assert!(matches!(*source, RunnerError::Scpi(ScpiError::UnexpectedArguments(_))));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_script_rejects_read_only_set() {
    let (instrument, monitor) = instrument();
    let writes = monitor.write_count();
    let (result, _) = run_script(&instrument, ":DMM:MEAS 3");

    let err = result.unwrap_err();
    assert!(err.to_string().contains(":DMM:MEAS 3"), "{}", err);
    assert_eq!(monitor.write_count(), writes);
}

#[test]
fn test_script_surfaces_link_failure() {
    let (instrument, monitor) = instrument();
    monitor.inject_fault(SimFault::Timeout);

    let (result, out) = run_script(&instrument, ":TRIG:STAT?; :CH1:DISP?");
    match result {
        Err(RunnerError::Command { command, source }) => {
            assert_eq!(command, ":TRIG:STAT?");
            assert!(matches!(*source, RunnerError::Exec(ExecError::Link(LinkError::Timeout))));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(out.is_empty());
}
