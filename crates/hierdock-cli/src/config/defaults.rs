use super::models::Protocol;

/// CLI-level defaults applied before the configuration file and command-line flags.
pub struct DefaultsConfig {
    pub plug_prefix: String,
    pub cyclic_prefix: String,
    pub cage_prefix: String,
    pub nout_debug: usize,
    pub nout_top: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            plug_prefix: "plug".to_string(),
            cyclic_prefix: "cyclic".to_string(),
            cage_prefix: "cage".to_string(),
            nout_debug: 0,
            nout_top: 0,
        }
    }
}

impl DefaultsConfig {
    pub fn prefix_for(&self, protocol: Protocol) -> &str {
        match protocol {
            Protocol::Plug => &self.plug_prefix,
            Protocol::Cyclic => &self.cyclic_prefix,
            Protocol::Cage => &self.cage_prefix,
        }
    }
}
