use ledlamp::drivers::driver::OpenError;
use ledlamp::fixture::config::FixtureConfig;
use ledlamp::fixture::frame::Frame;
use ledlamp::fixture::lamp::LedLamp;
use ledlamp_tools as ledlamp;

extern crate clap;
use clap::{value_parser, Arg, Command};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    if let Err(e) = ledlamp::drivers::init() {
        eprintln!("Failed to initialize lamp drivers: {}", e);
    }
    let matches = Command::new("send_pwm")
        .about("Send raw duty codes to a lamp, in wiring order.")
        .arg(
            Arg::new("CODES")
                .required(true)
                .num_args(1..)
                .value_parser(value_parser!(u8))
                .help("One duty code per channel"),
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
        .get_matches();

    let conf = match matches.get_one::<String>("config") {
        Some(path) => match FixtureConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load fixture from {}: {}", path, e);
                return;
            }
        },
        None => FixtureConfig::reference(),
    };
    let fixture = match conf.build() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Invalid fixture: {}", e);
            return;
        }
    };
    let frame = Frame(matches.get_many::<u8>("CODES").unwrap().copied().collect());
    let wiring = fixture.encoder().wiring().names_in_slot_order();
    for (name, code) in wiring.iter().zip(frame.as_bytes()) {
        println!("{:>8}: {}", name, code);
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
    if let Err(e) = lamp.set_duty_codes(&frame).await {
        eprintln!("Failed to send duty codes: {}", e);
    }
}
