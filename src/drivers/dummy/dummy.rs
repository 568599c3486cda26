use crate::drivers;
use drivers::driver::{CommandId, DriverInfo, DynFuture, LampDriver, OpenError, SendResult};
use log::info;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// Logs commands instead of sending them
pub struct DummyDriver {
    delay: Duration,
    sent: usize,
}

impl DummyDriver {
    pub fn new(delay: Duration) -> DummyDriver {
        DummyDriver { delay, sent: 0 }
    }

    /// Number of commands accepted so far
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl LampDriver for DummyDriver {
    fn send_command<'a>(
        &'a mut self,
        command: CommandId,
        payload: &'a [u8],
    ) -> DynFuture<'a, SendResult> {
        Box::pin(async move {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.sent += 1;
            info!("Command {}: {:02x?}", command, payload);
            SendResult::Ok
        })
    }
}

fn driver_open(params: HashMap<String, String>) -> Result<Box<dyn LampDriver>, OpenError> {
    let delay = match params.get("delay") {
        None => 0,
        Some(s) => u64::from_str(s)
            .map_err(|_| OpenError::ParameterError("delay has invalid value".to_string()))?,
    };
    Ok(Box::new(DummyDriver::new(Duration::from_millis(delay))))
}

pub fn driver_info() -> DriverInfo {
    DriverInfo {
        name: "DUMMY".to_string(),
        description: "Dummy driver. Logs commands. Parameters: delay (ms)".to_string(),
        open: driver_open,
    }
}
