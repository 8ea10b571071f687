use crate::shared::{Direction, Floor, RequestError};
use std::fmt;
use std::time::{Duration, Instant};

/**
 * One passenger trip from a pickup floor to a destination floor.
 *
 * A `Request` is immutable once built. It is owned by the dispatcher queue until the
 * dispatch loop takes it out and hands its two floors to exactly one car.
 *
 * # Fields
 * - `pickup`:          Floor the passenger is waiting on.
 * - `destination`:     Floor the passenger wants to reach. Never equal to `pickup`.
 * - `created_at`:      When the request was built, used to report waiting time.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pickup: Floor,
    destination: Floor,
    created_at: Instant,
}

impl Request {
    pub fn new(pickup: Floor, destination: Floor) -> Result<Request, RequestError> {
        if pickup == destination {
            return Err(RequestError::SameFloor(pickup));
        }

        Ok(Request {
            pickup,
            destination,
            created_at: Instant::now(),
        })
    }

    pub fn pickup(&self) -> Floor {
        self.pickup
    }

    pub fn destination(&self) -> Floor {
        self.destination
    }

    /// Travel direction of the passenger, never `Idle`.
    pub fn direction(&self) -> Direction {
        if self.destination > self.pickup {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn waiting_time(&self) -> Duration {
        self.created_at.elapsed()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.pickup, self.destination)
    }
}
