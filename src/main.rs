use std::process::ExitCode;

use loadsensor::{
    config::Config,
    core::{
        sensors::{ConfiguredSensor, Probes, Sensor},
        Engine,
    },
    logger::LoggerManager,
    print_error,
};
use tracing::{debug, error, info};

fn log_sensors_table(config: &Config) {
    let resources = config.sensors.resource_names();
    let width = resources
        .iter()
        .map(|s| s.len())
        .max()
        .unwrap_or(0)
        .max("Resource".len());

    info!("{:<width$} | Probe", "Resource", width = width);
    info!("{}-+-{}", "-".repeat(width), "-".repeat(12));
    for (resource, entry) in resources.iter().zip(&config.sensors.enabled) {
        info!("{:<width$} | {}", resource, entry.probe, width = width);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            print_error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let logger = match LoggerManager::new(config.logger.clone()) {
        Ok(logger) => logger,
        Err(e) => {
            print_error!("Failed to setup Log Manager: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logger.init() {
        print_error!("Failed to init Log Manager: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Starting loadsensor version {}...", env!("CARGO_PKG_VERSION"));
    info!("Log level: {}", config.logger.level);
    debug!("Available probes: {}", Probes::list().join(", "));
    log_sensors_table(&config);

    let sensors = match ConfiguredSensor::from_config(&config.sensors) {
        Ok(sensors) => sensors,
        Err(e) => {
            error!("Failed to build sensors: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let engine = match Engine::create(
        sensors
            .into_iter()
            .map(|s| Box::new(s) as Box<dyn Sensor>),
    ) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Invalid sensor set: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Waiting for load report requests on stdin");
    match engine.run_stdio().await {
        Ok(()) => {
            info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Load sensor stopped: {}", e);
            ExitCode::FAILURE
        }
    }
}
