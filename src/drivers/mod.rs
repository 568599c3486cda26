pub mod driver;
pub mod driver_init;
pub use driver::driver_descriptions;
pub use driver::driver_names;
pub use driver::open;
pub use driver_init::init;

pub mod dummy {
    pub mod dummy;
}
