/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::io;
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use super::structs::{CarId, Direction, Floor};

/***************************************/
/*            Error types              */
/***************************************/
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("pickup and destination are both floor {0}")]
    SameFloor(Floor),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CarError {
    #[error("car #{car}: floor {floor} does not exist (range {min}-{max})")]
    FloorOutOfRange {
        car: CarId,
        floor: Floor,
        min: Floor,
        max: Floor,
    },
    #[error("car #{car}: cannot move {direction} from floor {floor}")]
    MoveOutOfBounds {
        car: CarId,
        floor: Floor,
        direction: Direction,
    },
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("no cars available")]
    NoCars,
    #[error("cars cannot be added once the dispatcher is running")]
    AlreadyStarted,
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),
    #[error("dispatcher is no longer accepting requests")]
    Closed,
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
