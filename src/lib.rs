pub mod error;

pub mod color {
    pub mod chromaticity;
}

pub mod fixture {
    pub mod config;
    pub mod frame;
    pub mod lamp;
    pub mod palette;
    pub mod primary;
}

pub mod mixing {
    pub mod allocator;
    pub mod geometry;
}

pub mod drivers;

pub mod light_control {
    pub mod colored_light;
}

pub mod utils {
    pub mod combinations;
}
