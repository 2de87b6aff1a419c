/// Control payload that disables the gate
pub const GATE_DISABLE_MESSAGE: &str = "movement_detected";

/// External enable/disable switch for event emission.
///
/// Receiving `movement_detected` disables the gate; receiving ANY other
/// payload re-enables it, including messages unrelated to movement. That is
/// the specified message protocol, not an oversight. While disabled the
/// state machine keeps running; only emission downstream is suppressed.
#[derive(Debug, Clone)]
pub struct GateController {
    enabled: bool,
}

impl Default for GateController {
    fn default() -> Self {
        Self::new()
    }
}

impl GateController {
    pub fn new() -> Self {
        Self { enabled: true }
    }

    pub fn handle_message(&mut self, payload: &str) {
        self.enabled = payload != GATE_DISABLE_MESSAGE;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn reset(&mut self) {
        self.enabled = true;
    }
}
