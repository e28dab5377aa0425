use std::time::Duration;

use moongate_events::{Graphic, Layer, Serial};
use moongate_scripting_host::{
    ItemQuery, MoveRequest, Script, ScriptApi, ScriptFuture, ScriptResult,
};
use tracing::info;

/// Fish graphics the mover picks up
pub const FISH_GRAPHICS: [Graphic; 4] = [0x09CC, 0x09CD, 0x09CE, 0x09CF];

/// Moves caught fish out of the backpack through the paced move queue
#[derive(Default)]
pub struct FishMoverScript;

impl Script for FishMoverScript {
    fn name(&self) -> &str {
        "fish_mover"
    }

    fn description(&self) -> &str {
        "Moves fish from the backpack into a bag, or drops them at your feet"
    }

    fn run(&self, api: ScriptApi) -> ScriptFuture {
        Box::pin(move_fish(api))
    }
}

/// How long to wait for the host to report the backpack after launch
const BACKPACK_WAIT: Duration = Duration::from_secs(5);

async fn move_fish(api: ScriptApi) -> ScriptResult {
    api.wait_until(
        |world| world.find_layer(Layer::Backpack, None).is_some(),
        BACKPACK_WAIT,
    )
    .await;
    let Some(backpack) = api.find_layer(Layer::Backpack, None) else {
        api.sys_msg("fish_mover: no backpack");
        return Ok(());
    };

    let bag = api
        .script_config()
        .and_then(|c| c.get("bag").and_then(|b| b.as_integer()))
        .and_then(|b| u32::try_from(b).ok())
        .map(Serial)
        .filter(|bag| api.find_item(*bag).is_some());

    let mut queued = 0;
    for graphic in FISH_GRAPHICS {
        let query = ItemQuery {
            container: Some(backpack.serial),
            ..ItemQuery::graphic(graphic)
        };
        for fish in api.find_type_all(&query) {
            match bag {
                Some(bag) => api.que_move_item(MoveRequest::to_container(fish.serial, bag)),
                None => {
                    api.que_move_item_offset(fish.serial, 0, (1, 0, 0), false);
                }
            }
            queued += 1;
        }
    }
    info!(target: "scripts", "fish_mover queued {} stack(s)", queued);

    while api.is_processing_move_queue() {
        api.pause(Duration::from_millis(250)).await;
    }
    api.sys_msg(format!("fish_mover: moved {} stack(s)", queued));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo_scripts::tests::{TestHost, in_backpack};
    use moongate_events::{HostAction, MoveDestination};

    #[test]
    fn test_fish_go_to_configured_bag() {
        let mut host = TestHost::with_script_config("fish_mover", "bag = 1073741920");
        host.runner.register(FishMoverScript);
        host.spawn_player();
        host.send(in_backpack(Serial(0x4000_0060), 0x0E76));
        host.send(in_backpack(Serial(0x4000_0061), 0x09CC));
        host.send(in_backpack(Serial(0x4000_0062), 0x09CF));
        host.send(in_backpack(Serial(0x4000_0063), 0x0F7A));
        host.runner.launch("fish_mover").unwrap();

        host.run_for(Duration::from_secs(3));
        let moves: Vec<_> = host
            .actions()
            .into_iter()
            .filter_map(|a| match a {
                HostAction::MoveItem {
                    serial,
                    destination,
                    ..
                } => Some((serial, destination)),
                _ => None,
            })
            .collect();

        let bag = MoveDestination::Container {
            serial: Serial(0x4000_0060),
        };
        assert_eq!(
            moves,
            vec![(Serial(0x4000_0061), bag), (Serial(0x4000_0062), bag)]
        );
        assert!(!host.runner.is_running("fish_mover"));
    }

    #[test]
    fn test_waits_for_backpack_after_launch() {
        let mut host = TestHost::new();
        host.runner.register(FishMoverScript);
        host.runner.launch("fish_mover").unwrap();
        host.run_for(Duration::from_millis(200));
        assert!(host.runner.is_running("fish_mover"));

        host.spawn_player();
        host.send(in_backpack(Serial(0x4000_0061), 0x09CE));
        host.run_for(Duration::from_secs(2));
        assert!(!host.runner.is_running("fish_mover"));
        assert!(host
            .actions()
            .iter()
            .any(|a| matches!(a, HostAction::MoveItem { .. })));
    }

    #[test]
    fn test_fish_dropped_without_bag() {
        let mut host = TestHost::new();
        host.runner.register(FishMoverScript);
        host.spawn_player();
        host.send(in_backpack(Serial(0x4000_0061), 0x09CD));
        host.runner.launch("fish_mover").unwrap();

        host.run_for(Duration::from_millis(500));
        assert!(host.actions().iter().any(|a| matches!(
            a,
            HostAction::MoveItem {
                destination: MoveDestination::Ground { osi: false },
                ..
            }
        )));
    }
}
