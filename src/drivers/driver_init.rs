use crate::drivers;
use crate::error::DynResult;
use drivers::driver::add_driver;
use drivers::dummy::dummy;

/// Register the built-in drivers
pub fn init() -> DynResult<()> {
    add_driver(dummy::driver_info());
    Ok(())
}
