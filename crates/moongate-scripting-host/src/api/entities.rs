use moongate_events::{HostAction, Serial};

use super::ScriptApi;

impl ScriptApi {
    pub fn attack(&self, serial: Serial) -> bool {
        if !self.known(serial, "attack") {
            return false;
        }
        self.send(HostAction::Attack { serial });
        true
    }

    /// Single-click, which makes the host show the object's name
    pub fn click_object(&self, serial: Serial) -> bool {
        if !self.known(serial, "click_object") {
            return false;
        }
        self.send(HostAction::SingleClick { serial });
        true
    }

    /// Double-click `serial` and wait for the host to confirm the use
    pub async fn use_object(&self, serial: Serial) -> bool {
        if !self.known(serial, "use_object") {
            return false;
        }
        self.send_confirmed(HostAction::DoubleClick { serial }).await
    }

    pub fn equip_item(&self, serial: Serial) -> bool {
        if !self.known(serial, "equip_item") {
            return false;
        }
        self.send(HostAction::Equip { serial });
        true
    }

    /// Pick `entry` from the context menu of `serial`
    pub fn context_menu(&self, serial: Serial, entry: u16) -> bool {
        if !self.known(serial, "context_menu") {
            return false;
        }
        self.send(HostAction::ContextMenu { serial, entry });
        true
    }
}
