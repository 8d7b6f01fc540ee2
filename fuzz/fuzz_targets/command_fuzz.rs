//! Fuzz test for workflow command decoding and execution
//!
//! Feeds arbitrary bytes through the JSON command decoder and, when they
//! decode, through the engine against a freshly opened case. Looks for:
//! - Panics in payload decoding or validation
//! - Commands that leave a case with a status of another kind
//! - Failed commands that still mutate the case
//!
//! Run with: cargo +nightly fuzz run command_fuzz -- -max_total_time=60

#![no_main]

use std::sync::Arc;

use caseflow_core::{
    ActorId, CaseKind, Category, EngineConfig, ManualClock, NewCase, Severity,
};
use caseflow_workflow::{Command, CommandEnvelope, WorkflowEngine};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(input) = std::str::from_utf8(rest) else {
        return;
    };

    // One JSON command per line: {"command": "...", "payload": {...}}
    let commands: Vec<Command> = input
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();
    if commands.is_empty() {
        return;
    }

    let kind = CaseKind::ALL[*selector as usize % CaseKind::ALL.len()];
    let clock = Arc::new(ManualClock::new(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH));
    let engine = WorkflowEngine::in_memory(EngineConfig::default(), clock);
    let Ok(actor) = ActorId::new("fuzzer") else {
        return;
    };
    let seed = NewCase::new("fuzzed case", Category::Other, Severity::Medium);
    let Ok(opened) = engine.open_case(kind, &seed, &actor, None) else {
        return;
    };
    let id = opened.case.id;

    for command in commands {
        let Ok(before) = engine.view(&id) else {
            return;
        };
        let result = engine.execute(&id, CommandEnvelope::new(actor.clone(), command));
        let Ok(after) = engine.view(&id) else {
            return;
        };

        assert_eq!(after.case.status.kind(), kind, "status crossed kinds");
        assert!(after.case.check_integrity().is_ok(), "integrity broken");
        if result.is_err() {
            assert_eq!(before.case, after.case, "failed command mutated the case");
        }
    }
});
