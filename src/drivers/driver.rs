use lazy_static::lazy_static;
use log::debug;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

pub type DynFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Identifies what the device should do with the payload
pub type CommandId = u8;

#[derive(Debug)]
pub enum SendResult {
    Ok,
    Timeout,
    DriverError(Box<dyn Error + Send + Sync>),
}

impl SendResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, SendResult::Ok)
    }
}

impl fmt::Display for SendResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendResult::Ok => write!(f, "OK"),
            SendResult::Timeout => write!(f, "Timeout"),
            SendResult::DriverError(e) => write!(f, "Driver error: {}", e),
        }
    }
}

impl Error for SendResult {}

/// Anything that can deliver a command with a byte payload to a lamp
pub trait LampDriver: Send {
    fn send_command<'a>(
        &'a mut self,
        command: CommandId,
        payload: &'a [u8],
    ) -> DynFuture<'a, SendResult>;
}

#[derive(Debug)]
pub enum OpenError {
    NotFound,
    ParameterError(String),
    DriverError(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenError::NotFound => write!(f, "Driver not found"),
            OpenError::ParameterError(msg) => write!(f, "Invalid parameter: {}", msg),
            OpenError::DriverError(e) => write!(f, "Driver error: {}", e),
        }
    }
}

impl Error for OpenError {}

pub type OpenFn = fn(HashMap<String, String>) -> Result<Box<dyn LampDriver>, OpenError>;

pub struct DriverInfo {
    pub name: String,
    pub description: String,
    pub open: OpenFn,
}

lazy_static! {
    static ref DRIVERS: Mutex<Vec<DriverInfo>> = Mutex::new(Vec::new());
}

/// Register a driver. A driver with the same name is replaced.
pub fn add_driver(info: DriverInfo) {
    let mut drivers = DRIVERS.lock().unwrap_or_else(|e| e.into_inner());
    drivers.retain(|d| !d.name.eq_ignore_ascii_case(&info.name));
    drivers.push(info);
}

pub fn driver_names() -> Vec<String> {
    let drivers = DRIVERS.lock().unwrap_or_else(|e| e.into_inner());
    drivers.iter().map(|d| d.name.clone()).collect()
}

pub fn driver_descriptions() -> Vec<(String, String)> {
    let drivers = DRIVERS.lock().unwrap_or_else(|e| e.into_inner());
    drivers
        .iter()
        .map(|d| (d.name.clone(), d.description.clone()))
        .collect()
}

/// Split "NAME:key=value,key=value" into the name and parameters
pub fn parse_device(device: &str) -> Result<(&str, HashMap<String, String>), OpenError> {
    let (name, args) = match device.split_once(':') {
        Some((name, args)) => (name, args),
        None => (device, ""),
    };
    let mut params = HashMap::new();
    for arg in args.split(',').filter(|a| !a.is_empty()) {
        match arg.split_once('=') {
            Some((key, value)) => {
                params.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => {
                return Err(OpenError::ParameterError(format!(
                    "\"{}\" is not of the form key=value",
                    arg
                )))
            }
        }
    }
    Ok((name.trim(), params))
}

/// Open a driver by name. "default" selects the first registered driver.
pub fn open(device: &str) -> Result<Box<dyn LampDriver>, OpenError> {
    let (name, params) = parse_device(device)?;
    let open = {
        let drivers = DRIVERS.lock().unwrap_or_else(|e| e.into_inner());
        let info = if name.eq_ignore_ascii_case("default") {
            drivers.first()
        } else {
            drivers.iter().find(|d| d.name.eq_ignore_ascii_case(name))
        };
        match info {
            Some(info) => info.open,
            None => return Err(OpenError::NotFound),
        }
    };
    debug!("Opening driver {} with {:?}", name, params);
    open(params)
}
