/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{ConfigError, Floor, FloorRange};

/***************************************/
/*             Constants               */
/***************************************/
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const MAX_CARS: u8 = 5;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub building: BuildingConfig,
    pub car: CarConfig,
    pub generator: GeneratorConfig,
    pub simulation: SimulationConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BuildingConfig {
    pub min_floor: Floor,
    pub max_floor: Floor,
    pub start_floor: Floor,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CarConfig {
    pub tick_ms: u64,
    pub door_dwell_ms: u64,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    pub batch_pause_ms: u64,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub cars: u8,
    pub iteration_ms: u64,
    pub status_every: u32,
    pub batch_every: u32,
    pub batch_size: usize,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        BuildingConfig {
            min_floor: 0,
            max_floor: 9,
            start_floor: 1,
        }
    }
}

impl Default for CarConfig {
    fn default() -> Self {
        CarConfig {
            tick_ms: 1000,
            door_dwell_ms: 2000,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            min_interval_ms: 2000,
            max_interval_ms: 8000,
            batch_pause_ms: 500,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            cars: 3,
            iteration_ms: 3000,
            status_every: 5,
            batch_every: 3,
            batch_size: 2,
        }
    }
}

impl BuildingConfig {
    pub fn floors(&self) -> FloorRange {
        FloorRange::new(self.min_floor, self.max_floor)
    }
}

impl CarConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn door_dwell(&self) -> Duration {
        Duration::from_millis(self.door_dwell_ms)
    }
}

impl GeneratorConfig {
    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }
}

impl Config {
    /// Checks the cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let building = &self.building;
        if building.min_floor >= building.max_floor {
            return Err(ConfigError::Invalid(format!(
                "min_floor ({}) must be below max_floor ({})",
                building.min_floor, building.max_floor
            )));
        }
        if !building.floors().contains(building.start_floor) {
            return Err(ConfigError::Invalid(format!(
                "start_floor {} is outside {}",
                building.start_floor,
                building.floors()
            )));
        }
        if self.simulation.cars == 0 || self.simulation.cars > MAX_CARS {
            return Err(ConfigError::Invalid(format!(
                "cars must be within 1..={}, got {}",
                MAX_CARS, self.simulation.cars
            )));
        }
        if self.car.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be positive".into()));
        }
        if self.generator.min_interval_ms >= self.generator.max_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "generator interval [{}, {}) is empty",
                self.generator.min_interval_ms, self.generator.max_interval_ms
            )));
        }
        Ok(())
    }
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config_str = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&config_str)?;
    config.validate()?;
    Ok(config)
}

/***************************************/
/*             Unit tests              */
/***************************************/
