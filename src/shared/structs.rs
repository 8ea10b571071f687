/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Serialize;
use std::fmt;

/***************************************/
/*            Type aliases             */
/***************************************/
pub type Floor = i32;
pub type CarId = u32;

/***************************************/
/*       Public data structures        */
/***************************************/

/// Inclusive range of floors a car may stop at.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloorRange {
    pub min: Floor,
    pub max: Floor,
}

impl FloorRange {
    pub fn new(min: Floor, max: Floor) -> FloorRange {
        FloorRange { min, max }
    }

    pub fn contains(&self, floor: Floor) -> bool {
        self.min <= floor && floor <= self.max
    }
}

impl fmt::Display for FloorRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Idle,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Idle => write!(f, "idle"),
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    #[serde(rename = "stopped")]
    Stopped,
    #[serde(rename = "moving")]
    Moving,
    #[serde(rename = "doorsOpening")]
    DoorsOpening,
    #[serde(rename = "doorsClosing")]
    DoorsClosing,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Stopped => write!(f, "stopped"),
            Status::Moving => write!(f, "moving"),
            Status::DoorsOpening => write!(f, "doors opening"),
            Status::DoorsClosing => write!(f, "doors closing"),
        }
    }
}

/// Point-in-time copy of one car, taken under the car's lock.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CarSnapshot {
    pub id: CarId,
    pub floor: Floor,
    pub direction: Direction,
    pub status: Status,
    #[serde(rename = "pendingStops")]
    pub pending_stops: Vec<Floor>,
}

impl CarSnapshot {
    pub fn is_idle(&self) -> bool {
        self.status == Status::Stopped && self.direction == Direction::Idle
    }
}

impl fmt::Display for CarSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "car #{} at floor {}, {}, heading {}, stops {:?}",
            self.id, self.floor, self.status, self.direction, self.pending_stops
        )
    }
}

/// Status report of the whole system.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Snapshot {
    #[serde(rename = "queueLength")]
    pub queue_len: usize,
    pub assigned: u64,
    pub dropped: u64,
    pub cars: Vec<CarSnapshot>,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---------------- STATUS ----------------")?;
        writeln!(
            f,
            "queued: {}  assigned: {}  dropped: {}",
            self.queue_len, self.assigned, self.dropped
        )?;
        for car in &self.cars {
            writeln!(f, "{}", car)?;
        }
        write!(f, "----------------------------------------")
    }
}
