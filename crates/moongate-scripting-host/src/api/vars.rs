use super::ScriptApi;
use crate::vars::VarScope;

impl ScriptApi {
    /// Empty names are refused with a system message
    fn valid_var_name(&self, name: &str) -> bool {
        if name.trim().is_empty() {
            self.sys_msg("Invalid variable name");
            return false;
        }
        true
    }

    // ===== Shared variables =====

    pub fn set_shared_var(&self, name: &str, value: impl Into<toml::Value>) -> bool {
        if !self.valid_var_name(name) {
            return false;
        }
        self.engine().shared.set(name, value.into());
        true
    }

    pub fn get_shared_var(&self, name: &str) -> Option<toml::Value> {
        self.engine().shared.get(name).cloned()
    }

    pub fn remove_shared_var(&self, name: &str) -> bool {
        self.engine().shared.remove(name).is_some()
    }

    pub fn clear_shared_vars(&self) {
        self.engine().shared.clear();
    }

    // ===== Persistent variables =====

    /// Store a string saved across sessions under the profile's `scope`
    pub fn save_persistent_var(&self, name: &str, value: impl Into<String>, scope: VarScope) -> bool {
        if !self.valid_var_name(name) {
            return false;
        }
        self.engine().persistent.set(name, value, scope);
        true
    }

    pub fn get_persistent_var(&self, name: &str, scope: VarScope) -> Option<String> {
        self.engine()
            .persistent
            .get(name, scope)
            .map(str::to_string)
    }

    pub fn remove_persistent_var(&self, name: &str, scope: VarScope) -> bool {
        if !self.valid_var_name(name) {
            return false;
        }
        self.engine().persistent.remove(name, scope)
    }
}
