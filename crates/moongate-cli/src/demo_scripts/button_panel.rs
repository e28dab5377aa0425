use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use moongate_events::{GumpConfig, Rect, TargetKind, TargetResult};
use moongate_scripting_host::{
    Script, ScriptApi, ScriptError, ScriptFuture, ScriptResult, controls,
};
use tracing::info;

/// What the panel's buttons asked for since the last look
#[derive(Default)]
struct Requests {
    inspect: Cell<bool>,
    quit: Cell<bool>,
}

/// A small gump with an "Inspect" button that asks for a target
#[derive(Default)]
pub struct ButtonPanelScript;

impl Script for ButtonPanelScript {
    fn name(&self) -> &str {
        "button_panel"
    }

    fn description(&self) -> &str {
        "Shows a panel whose Inspect button asks for a target and names it"
    }

    fn run(&self, api: ScriptApi) -> ScriptFuture {
        Box::pin(show_panel(api))
    }
}

async fn show_panel(api: ScriptApi) -> ScriptResult {
    let gump = api.create_gump(GumpConfig {
        rect: Rect {
            x: 50,
            y: 50,
            width: 180,
            height: 90,
        },
        ..GumpConfig::default()
    });
    api.add_control(gump, controls::color_box(0.7, "#000000"), Rect {
        x: 0,
        y: 0,
        width: 180,
        height: 90,
    });
    api.add_control(gump, controls::label("Inspector"), Rect {
        x: 10,
        y: 5,
        width: 160,
        height: 20,
    });
    let buttons = (
        api.add_control(gump, controls::simple_button("Inspect"), Rect {
            x: 10,
            y: 35,
            width: 75,
            height: 25,
        }),
        api.add_control(gump, controls::simple_button("Close"), Rect {
            x: 95,
            y: 35,
            width: 75,
            height: 25,
        }),
    );
    let (Some(inspect), Some(close)) = buttons else {
        return Err(ScriptError::Fault("panel controls could not be added".into()));
    };

    let requests = Rc::new(Requests::default());
    let r = requests.clone();
    api.add_control_on_click(gump, inspect, true, move |_| r.inspect.set(true));
    let r = requests.clone();
    api.add_control_on_click(gump, close, true, move |_| r.quit.set(true));
    let r = requests.clone();
    api.add_gump_on_closed(gump, move |_| r.quit.set(true));
    api.add_gump(gump);

    loop {
        api.process_callbacks();

        if requests.quit.get() {
            break;
        }
        if requests.inspect.replace(false) {
            inspect_target(&api).await;
        }
        api.pause(Duration::from_millis(100)).await;
    }

    info!(target: "scripts", "button_panel closed");
    api.close_gumps();
    Ok(())
}

async fn inspect_target(api: &ScriptApi) {
    api.sys_msg("Select something to inspect");
    match api.request_target_kind(TargetKind::Object, Duration::from_secs(10)).await {
        Some(TargetResult::Object { serial }) => {
            let name = api
                .find_mobile(serial)
                .map(|m| m.name)
                .or_else(|| api.find_item(serial).map(|i| i.name))
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "something unknown".to_string());
            api.head_msg(name, serial, None);
        }
        Some(TargetResult::Location { location, .. }) => {
            api.sys_msg(format!("That is the ground at {}, {}", location.x, location.y));
        }
        None => api.sys_msg("Never mind"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo_scripts::tests::{TestHost, hostile};
    use moongate_events::{
        ControlId, GumpId, HostAction, HostEvent, MouseButton, Serial, TargetSession,
    };

    fn click(control: u32) -> HostEvent {
        HostEvent::ControlClicked {
            gump: GumpId(1),
            control: ControlId(control),
            button: MouseButton::Left,
        }
    }

    #[test]
    fn test_inspect_names_the_target() {
        let mut host = TestHost::new();
        host.runner.register(ButtonPanelScript);
        host.spawn_player();
        host.send(hostile(Serial(0x500), 2));
        host.runner.launch("button_panel").unwrap();
        host.run_for(Duration::from_millis(200));

        host.send(click(3));
        host.run_for(Duration::from_millis(200));
        let armed = host
            .actions()
            .into_iter()
            .find_map(|a| match a {
                HostAction::ArmTargetCursor { session, .. } => Some(session),
                _ => None,
            });
        assert_eq!(armed, Some(TargetSession(0)));

        host.send(HostEvent::TargetResult {
            session: TargetSession(0),
            result: TargetResult::Object {
                serial: Serial(0x500),
            },
        });
        host.run_for(Duration::from_millis(100));
        assert!(host.actions().contains(&HostAction::HeadMessage {
            serial: Serial(0x500),
            text: "a troll".to_string(),
            hue: None,
        }));
    }

    #[test]
    fn test_close_button_ends_script_and_gump() {
        let mut host = TestHost::new();
        host.runner.register(ButtonPanelScript);
        host.runner.launch("button_panel").unwrap();
        host.run_for(Duration::from_millis(200));

        host.send(click(4));
        host.run_for(Duration::from_millis(300));

        assert!(!host.runner.is_running("button_panel"));
        assert!(host
            .actions()
            .contains(&HostAction::CloseGump { gump: GumpId(1) }));
    }
}
