use std::time::Duration;

use moongate_events::NotorietyFilter;
use moongate_scripting_host::{DEFAULT_SCAN_DISTANCE, Script, ScriptApi, ScriptFuture, ScriptResult};
use tracing::info;

const HEAD_HUE: u16 = 0x0021;

/// Calls the guards on every hostile that comes within range, once each
#[derive(Default)]
pub struct GuardCallerScript;

impl Script for GuardCallerScript {
    fn name(&self) -> &str {
        "guard_caller"
    }

    fn description(&self) -> &str {
        "Yells for guards when a hostile mobile comes within range"
    }

    fn run(&self, api: ScriptApi) -> ScriptFuture {
        Box::pin(call_guards(api))
    }
}

async fn call_guards(api: ScriptApi) -> ScriptResult {
    let range = api
        .script_config()
        .and_then(|c| c.get("range").and_then(|r| r.as_integer()))
        .and_then(|r| u32::try_from(r).ok())
        .unwrap_or(DEFAULT_SCAN_DISTANCE);
    info!(target: "scripts", "guard_caller watching {} tiles", range);

    while !api.in_journal("You are dead") {
        if let Some(hostile) = api.nearest_mobile(NotorietyFilter::HOSTILE, range) {
            api.yell_msg("Guards! Help!");
            api.head_msg("*hostile*", hostile.serial, Some(HEAD_HUE));
            // Each hostile is reported once
            api.ignore_object(hostile.serial);
        }
        api.pause(Duration::from_millis(500)).await;
    }

    api.sys_msg("guard_caller: dead, stopping");
    Ok(())
}
