use crate::color::chromaticity::Color;
use crate::drivers::driver::{CommandId, LampDriver, SendResult};
use crate::error::MixError;
use crate::fixture::frame::{Frame, FrameEncoder};
use crate::fixture::palette::Palette;
use crate::mixing::allocator::{Allocation, MixingAllocator};
use log::debug;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Command that sets the duty cycle of all channels
pub const SET_PWM_COMMAND: CommandId = 1;

#[derive(Debug)]
pub enum LampError {
    Mix(MixError),
    /// Failure reported by the driver, unchanged
    Send(SendResult),
    FrameLength { expected: usize, got: usize },
}

impl fmt::Display for LampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LampError::Mix(e) => write!(f, "{}", e),
            LampError::Send(e) => write!(f, "Sending failed: {}", e),
            LampError::FrameLength { expected, got } => {
                write!(f, "Frame has {} channels, expected {}", got, expected)
            }
        }
    }
}

impl Error for LampError {}

impl From<MixError> for LampError {
    fn from(e: MixError) -> LampError {
        LampError::Mix(e)
    }
}

/// Everything needed to go from a color to a frame for one kind of lamp
#[derive(Clone, Debug)]
pub struct Fixture {
    allocator: MixingAllocator,
    encoder: FrameEncoder,
    command: CommandId,
}

impl Fixture {
    pub fn new(allocator: MixingAllocator, encoder: FrameEncoder, command: CommandId) -> Fixture {
        Fixture {
            allocator,
            encoder,
            command,
        }
    }

    pub fn palette(&self) -> &Arc<Palette> {
        self.allocator.palette()
    }

    pub fn allocator(&self) -> &MixingAllocator {
        &self.allocator
    }

    pub fn encoder(&self) -> &FrameEncoder {
        &self.encoder
    }

    pub fn command(&self) -> CommandId {
        self.command
    }

    pub fn mix(&self, color: &Color) -> Result<(Allocation, Frame), MixError> {
        let allocation = self.allocator.allocate(color)?;
        let frame = self.encoder.encode(&allocation)?;
        Ok((allocation, frame))
    }
}

/// A lamp connected through a driver.
///
/// Requests are handled one at a time, in the order they get hold of the
/// driver.
pub struct LedLamp {
    fixture: Fixture,
    driver: Mutex<Box<dyn LampDriver>>,
}

impl LedLamp {
    pub fn new(fixture: Fixture, driver: Box<dyn LampDriver>) -> LedLamp {
        LedLamp {
            fixture,
            driver: Mutex::new(driver),
        }
    }

    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }

    /// Frame that [`LedLamp::set_color`] would send, without sending it
    pub fn mix(&self, color: &Color) -> Result<(Allocation, Frame), MixError> {
        self.fixture.mix(color)
    }

    /// Make the lamp produce `color`. Returns the frame that was sent.
    pub async fn set_color(&self, color: &Color) -> Result<Frame, LampError> {
        let mut driver = self.driver.lock().await;
        let (allocation, frame) = self.fixture.mix(color)?;
        debug!(
            "{:?}: {:?} -> {}",
            color,
            allocation.named(self.fixture.palette()),
            frame
        );
        Self::send(&mut **driver, self.fixture.command, &frame).await?;
        Ok(frame)
    }

    /// Send duty codes directly, in wiring order
    pub async fn set_duty_codes(&self, frame: &Frame) -> Result<(), LampError> {
        let expected = self.fixture.encoder.frame_len();
        if frame.0.len() != expected {
            return Err(LampError::FrameLength {
                expected,
                got: frame.0.len(),
            });
        }
        let mut driver = self.driver.lock().await;
        debug!("Setting duty codes {}", frame);
        Self::send(&mut **driver, self.fixture.command, frame).await
    }

    async fn send(
        driver: &mut dyn LampDriver,
        command: CommandId,
        frame: &Frame,
    ) -> Result<(), LampError> {
        match driver.send_command(command, frame.as_bytes()).await {
            SendResult::Ok => Ok(()),
            e => Err(LampError::Send(e)),
        }
    }
}
