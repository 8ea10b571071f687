use crate::shared::{CarError, CarId, CarSnapshot, Direction, Floor, FloorRange, Status};
use crossbeam_channel as cbc;
use log::{debug, error, info};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/**
 * Mutable state of one car. Only ever touched through the `Car` lock.
 *
 * # Fields
 * - `floor`:       Current floor, always inside the car's `FloorRange`.
 * - `direction`:   Direction of travel. `Idle` iff `stops` is empty and `status` is `Stopped`,
 *                  checked at tick boundaries.
 * - `status`:      Motion status.
 * - `stops`:       Pending stop floors, ascending and deduplicated.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct CarState {
    pub floor: Floor,
    pub direction: Direction,
    pub status: Status,
    pub stops: BTreeSet<Floor>,
}

impl CarState {
    pub fn new(floor: Floor) -> CarState {
        CarState {
            floor,
            direction: Direction::Idle,
            status: Status::Stopped,
            stops: BTreeSet::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status == Status::Stopped && self.direction == Direction::Idle
    }

    /// The floor the car is heading for, or `None` without pending stops.
    ///
    /// Going up: the nearest stop above, else the lowest stop. Going down: the nearest stop
    /// below, else the highest stop. Idle: the lowest stop.
    pub fn next_target(&self) -> Option<Floor> {
        let floor = self.floor;
        match self.direction {
            Direction::Up => self
                .stops
                .range(floor + 1..)
                .next()
                .or_else(|| self.stops.first())
                .copied(),
            Direction::Down => self
                .stops
                .range(..floor)
                .next_back()
                .or_else(|| self.stops.last())
                .copied(),
            Direction::Idle => self.stops.first().copied(),
        }
    }

    fn settle(&mut self) {
        self.direction = Direction::Idle;
        self.status = Status::Stopped;
    }
}

/// What the first half of a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// No pending stops; the car is (now) stopped and idle.
    Idle,
    /// Moved one floor and is now at the contained floor.
    Moved(Floor),
    /// Reached a pending stop and opened its doors; `finish_arrival` must follow the dwell.
    Arrived(Floor),
}

/**
 * Thread-safe handle to one elevator car.
 *
 * A `Car` is a small monitor: all state sits behind one mutex and is only exposed as
 * whole-state snapshots or through the mutators below. Clones share the same car, so the
 * dispatcher scores and feeds it while its `CarController` drives it.
 *
 * # Fields
 * - `id`:          Identity assigned by the dispatcher at creation.
 * - `floors`:      Floors the car may visit.
 * - `state`:       The guarded `CarState`.
 * - `wake_tx`:     Nudges an idle controller when a stop is added.
 * - `wake_rx`:     Receiving side, taken by the controller.
 */
#[derive(Clone)]
pub struct Car {
    id: CarId,
    floors: FloorRange,
    state: Arc<Mutex<CarState>>,
    wake_tx: cbc::Sender<()>,
    wake_rx: cbc::Receiver<()>,
}

impl Car {
    pub fn new(id: CarId, floors: FloorRange, start_floor: Floor) -> Car {
        let (wake_tx, wake_rx) = cbc::bounded::<()>(1);
        let start_floor = start_floor.max(floors.min).min(floors.max);
        Car {
            id,
            floors,
            state: Arc::new(Mutex::new(CarState::new(start_floor))),
            wake_tx,
            wake_rx,
        }
    }

    pub fn id(&self) -> CarId {
        self.id
    }

    pub(crate) fn wake_rx(&self) -> cbc::Receiver<()> {
        self.wake_rx.clone()
    }

    /// Adds a pending stop. Adding an already pending floor changes nothing.
    pub fn add_stop(&self, floor: Floor) -> Result<(), CarError> {
        match self.add_stops(&[floor]).pop() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Adds several stops under one lock acquisition, so the controller never sees only part
    /// of them. Each floor is validated on its own; rejected floors are returned.
    pub fn add_stops(&self, floors: &[Floor]) -> Vec<CarError> {
        let mut rejected = Vec::new();
        let mut accepted = false;

        {
            let mut state = self.lock();
            for &floor in floors {
                if !self.floors.contains(floor) {
                    rejected.push(CarError::FloorOutOfRange {
                        car: self.id,
                        floor,
                        min: self.floors.min,
                        max: self.floors.max,
                    });
                    continue;
                }

                accepted = true;
                if state.stops.insert(floor) {
                    debug!("Car #{} got stop at floor {}", self.id, floor);
                }
            }
        }

        if accepted {
            // A full slot already guarantees a wake-up
            let _ = self.wake_tx.try_send(());
        }
        rejected
    }

    pub fn current_floor(&self) -> Floor {
        self.lock().floor
    }

    pub fn status(&self) -> Status {
        self.lock().status
    }

    pub fn direction(&self) -> Direction {
        self.lock().direction
    }

    pub fn pending_stops(&self) -> Vec<Floor> {
        self.lock().stops.iter().copied().collect()
    }

    /// Every scorer-visible field, read under a single lock acquisition.
    pub fn snapshot(&self) -> CarSnapshot {
        let state = self.lock();
        CarSnapshot {
            id: self.id,
            floor: state.floor,
            direction: state.direction,
            status: state.status,
            pending_stops: state.stops.iter().copied().collect(),
        }
    }

    /// First half of a control tick: settle when idle, otherwise move one floor toward the
    /// next target and open the doors if it has been reached.
    pub fn step(&self) -> Result<Step, CarError> {
        let mut state = self.lock();

        let Some(target) = state.next_target() else {
            if !state.is_idle() {
                state.settle();
                info!("Car #{} stopped at floor {}", self.id, state.floor);
            }
            return Ok(Step::Idle);
        };

        if target > state.floor {
            self.move_one(&mut state, Direction::Up)?;
        } else if target < state.floor {
            self.move_one(&mut state, Direction::Down)?;
        }

        if state.floor == target {
            debug!("Car #{} stopped at floor {}, opening doors", self.id, target);
            state.status = Status::DoorsOpening;
            return Ok(Step::Arrived(target));
        }

        Ok(Step::Moved(state.floor))
    }

    /// Second half of an arrival: close the doors and drop the serviced stop.
    pub fn finish_arrival(&self, floor: Floor) {
        let mut state = self.lock();
        state.status = Status::DoorsClosing;
        state.stops.remove(&floor);
        debug!("Car #{} closing doors at floor {}", self.id, floor);

        if state.stops.is_empty() {
            state.settle();
            info!("Car #{} serviced floor {} and is now idle", self.id, floor);
        } else {
            if state.direction == Direction::Idle {
                if let Some(next) = state.next_target() {
                    state.direction = if next > state.floor {
                        Direction::Up
                    } else {
                        Direction::Down
                    };
                }
            }
            info!("Car #{} serviced floor {}, stops left {:?}", self.id, floor, state.stops);
        }
    }

    fn move_one(&self, state: &mut CarState, direction: Direction) -> Result<(), CarError> {
        let next = match direction {
            Direction::Up => state.floor + 1,
            Direction::Down => state.floor - 1,
            Direction::Idle => state.floor,
        };

        if !self.floors.contains(next) {
            let e = CarError::MoveOutOfBounds {
                car: self.id,
                floor: state.floor,
                direction,
            };
            error!("{}", e);
            return Err(e);
        }

        state.floor = next;
        state.direction = direction;
        state.status = Status::Moving;
        debug!("Car #{} moved {} to floor {}", self.id, direction, next);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, CarState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub fn test_set_state(&self, state: CarState) {
        *self.lock() = state;
    }

    #[cfg(test)]
    pub fn test_get_state(&self) -> CarState {
        self.lock().clone()
    }
}
