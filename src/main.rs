/* 3rd party libraries */
use clap::Parser;
use log::{error, info, warn};
use std::io::{self, BufRead};
use std::path::Path;
use std::process;
use std::thread::sleep;
use std::time::Duration;

/* Custom libraries */
use config::{Config, DEFAULT_CONFIG_PATH};
use dispatcher::Dispatcher;
use request::RequestGenerator;
use shared::ConfigError;

/* Modules */
mod config;
mod dispatcher;
mod elevator;
mod request;
mod shared;

/* Command line */
#[derive(Parser, Debug)]
#[clap(version, about = "Multi-car elevator dispatch simulation")]
struct Args {
    /// Path to the TOML configuration file
    #[clap(long, short, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Number of cars (1-5), overrides the configuration file
    #[clap(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    cars: Option<u8>,

    /// Run this many iterations, otherwise run until Enter is pressed
    #[clap(long, short, value_parser = clap::value_parser!(u32).range(1..))]
    iterations: Option<u32>,

    /// Print status reports as JSON
    #[clap(long)]
    json: bool,
}

/* Main */
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = match config::load_config(Path::new(&args.config)) {
        Ok(config) => config,
        Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            warn!("No configuration file at {}, using defaults", args.config);
            Config::default()
        }
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    if let Some(cars) = args.cars {
        config.simulation.cars = cars;
    }

    // Build the system
    let mut dispatcher = Dispatcher::new(&config);
    for _ in 0..config.simulation.cars {
        unwrap_or_exit!(dispatcher.add_car(), "Failed to add car");
    }

    let mut generator = RequestGenerator::new(
        dispatcher.handle(),
        config.building.floors(),
        &config.generator,
    );

    // Start the cars, the dispatcher and the request generator
    unwrap_or_exit!(dispatcher.start(), "Failed to start dispatcher");
    unwrap_or_exit!(generator.start(), "Failed to start request generator");
    sleep(config.car.tick());

    match args.iterations {
        Some(iterations) => run_fixed(&config, &dispatcher, &generator, iterations, args.json),
        None => run_unbounded(&dispatcher, args.json),
    }

    info!("Shutting down");
    generator.stop();
    sleep(config.car.tick());
    print_status(&dispatcher, args.json);
    dispatcher.stop();
}

fn run_fixed(
    config: &Config,
    dispatcher: &Dispatcher,
    generator: &RequestGenerator,
    iterations: u32,
    json: bool,
) {
    let simulation = &config.simulation;
    info!("Running {} iterations", iterations);

    for i in 1..=iterations {
        sleep(Duration::from_millis(simulation.iteration_ms));

        if (simulation.status_every > 0 && i % simulation.status_every == 0) || i == iterations {
            print_status(dispatcher, json);
        }

        if simulation.batch_every > 0 && i % simulation.batch_every == 0 {
            generator.generate_batch(simulation.batch_size);
        }
    }

    info!("Finished {} iterations", iterations);
}

fn run_unbounded(dispatcher: &Dispatcher, json: bool) {
    print_status(dispatcher, json);
    info!("Running until Enter is pressed");

    let mut line = String::new();
    if let Err(e) = io::stdin().lock().read_line(&mut line) {
        warn!("Failed to read from stdin: {}", e);
    }
}

fn print_status(dispatcher: &Dispatcher, json: bool) {
    let snapshot = dispatcher.snapshot();
    if json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(text) => println!("{}", text),
            Err(e) => warn!("Failed to serialize status: {}", e),
        }
    } else {
        println!("{}", snapshot);
    }
}
