use ledlamp::color::chromaticity::Color;
use ledlamp::drivers::driver::OpenError;
use ledlamp::fixture::config::FixtureConfig;
use ledlamp::fixture::lamp::{Fixture, LedLamp};
use ledlamp::light_control::colored_light::{ColoredLight, LightValue};
use ledlamp_tools as ledlamp;

extern crate clap;
use clap::{value_parser, Arg, ArgAction, Command};

fn load_fixture(path: Option<&String>) -> Option<Fixture> {
    let conf = match path {
        Some(path) => match FixtureConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load fixture from {}: {}", path, e);
                return None;
            }
        },
        None => FixtureConfig::reference(),
    };
    match conf.build() {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!("Invalid fixture: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    if let Err(e) = ledlamp::drivers::init() {
        eprintln!("Failed to initialize lamp drivers: {}", e);
    }
    let matches = Command::new("set_color")
        .about("Mix a color from the primaries of a lamp and send it.")
        .arg(
            Arg::new("VALUES")
                .required(true)
                .num_args(1..=3)
                .allow_negative_numbers(true)
                .value_parser(value_parser!(f64))
                .help("x y luminance, or only luminance with --kelvin"),
        )
        .arg(
            Arg::new("kelvin")
                .short('k')
                .long("kelvin")
                .value_parser(value_parser!(u32))
                .help("Color temperature instead of x and y"),
        )
        .arg(
            Arg::new("DEVICE")
                .short('d')
                .long("device")
                .default_value("default")
                .help("Select lamp driver"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Fixture description (JSON)"),
        )
        .arg(
            Arg::new("dry_run")
                .short('n')
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Print the frame without sending it"),
        )
        .get_matches();

    let values: Vec<f64> = matches
        .get_many::<f64>("VALUES")
        .unwrap()
        .copied()
        .collect();
    let kelvin = matches.get_one::<u32>("kelvin").copied();
    let light = match (kelvin, values.as_slice()) {
        (Some(kelvin), &[luminance]) => LightValue {
            luminance,
            color: ColoredLight::ColorTemp { kelvin },
        },
        (None, &[x, y, luminance]) => LightValue {
            luminance,
            color: ColoredLight::Coordinate { x, y },
        },
        _ => {
            eprintln!("Expected x, y and luminance, or luminance and --kelvin");
            return;
        }
    };
    let color: Color = match light.to_color() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };

    let Some(fixture) = load_fixture(matches.get_one::<String>("config")) else {
        return;
    };
    let (allocation, frame) = match fixture.mix(&color) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to mix color: {}", e);
            return;
        }
    };
    for (name, luminance) in allocation.named(fixture.palette()) {
        println!("{:>8}: {:.3}", name, luminance);
    }
    println!("Frame: {}", frame);
    if matches.get_flag("dry_run") {
        return;
    }

    let device_name = matches.get_one::<String>("DEVICE").unwrap();
    let driver = match ledlamp::drivers::open(device_name) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to open lamp device: {}", e);
            if let OpenError::NotFound = e {
                eprintln!("Available drivers:");
                for (name, description) in ledlamp::drivers::driver_descriptions() {
                    eprintln!("  {}: {}", name, description);
                }
            }
            return;
        }
    };
    let lamp = LedLamp::new(fixture, driver);
    if let Err(e) = lamp.set_color(&color).await {
        eprintln!("Failed to set color: {}", e);
    }
}
