use crate::config::CarConfig;
use crate::elevator::car::{Car, Step};
use crossbeam_channel as cbc;
use log::{info, warn};
use std::time::Duration;

enum Event {
    Tick,
    Woken,
    Terminate,
}

/**
 * Drives one car's motion state machine on its own thread.
 *
 * Every tick the controller lets the car take one step. An arrival holds the doors open for
 * the dwell time before the stop is removed. Without pending stops the controller blocks until
 * the car is woken by a new stop or the controller is told to terminate. A terminate signal
 * ends the loop at the next wait, abandoning a door dwell in progress.
 *
 * # Fields
 * - `car`:             Shared handle of the car being driven.
 * - `tick`:            Pause between two steps.
 * - `door_dwell`:      How long the doors stay open on arrival.
 * - `wake_rx`:         Signalled by `Car::add_stop`.
 * - `terminate_rx`:    Signalled (or disconnected) on shutdown.
 */
pub struct CarController {
    car: Car,
    tick: Duration,
    door_dwell: Duration,
    wake_rx: cbc::Receiver<()>,
    terminate_rx: cbc::Receiver<()>,
}

impl CarController {
    pub fn new(car: Car, config: &CarConfig, terminate_rx: cbc::Receiver<()>) -> CarController {
        CarController {
            wake_rx: car.wake_rx(),
            car,
            tick: config.tick(),
            door_dwell: config.door_dwell(),
            terminate_rx,
        }
    }

    pub fn run(self) {
        info!("Car #{} started at floor {}", self.car.id(), self.car.current_floor());

        loop {
            let event = match self.car.step() {
                Ok(Step::Idle) => self.wait_for_stop(),
                Ok(Step::Moved(_)) => self.wait(self.tick),
                Ok(Step::Arrived(floor)) => match self.wait(self.door_dwell) {
                    Event::Terminate => Event::Terminate,
                    _ => {
                        self.car.finish_arrival(floor);
                        self.wait(self.tick)
                    }
                },
                Err(e) => {
                    warn!("Car #{} skipped a tick: {}", self.car.id(), e);
                    self.wait(self.tick)
                }
            };

            if let Event::Terminate = event {
                break;
            }
        }

        info!("Car #{} stopped", self.car.id());
    }

    // Sleeps for `duration` unless told to terminate first
    fn wait(&self, duration: Duration) -> Event {
        match self.terminate_rx.recv_timeout(duration) {
            Err(cbc::RecvTimeoutError::Timeout) => Event::Tick,
            _ => Event::Terminate,
        }
    }

    // Blocks until a stop is added or the controller is told to terminate
    fn wait_for_stop(&self) -> Event {
        cbc::select! {
            recv(self.wake_rx) -> _ => Event::Woken,
            recv(self.terminate_rx) -> _ => Event::Terminate,
        }
    }
}
