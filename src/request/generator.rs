/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info, warn};
use rand::Rng;
use std::thread::{self, Builder, JoinHandle};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::GeneratorConfig;
use crate::dispatcher::DispatchHandle;
use crate::shared::{Floor, FloorRange};

/**
 * Produces random passenger requests, either on its own thread or in synchronous batches.
 *
 * # Fields
 * - `handle`:      Enqueue endpoint of the dispatcher.
 * - `floors`:      Floors requests are drawn from.
 * - `config`:      Delay bounds for the producer thread and the pause between batch requests.
 * - `worker`:      Terminate sender and join handle of the running producer thread, if any.
 */
pub struct RequestGenerator {
    handle: DispatchHandle,
    floors: FloorRange,
    config: GeneratorConfig,
    worker: Option<(cbc::Sender<()>, JoinHandle<()>)>,
}

impl RequestGenerator {
    pub fn new(handle: DispatchHandle, floors: FloorRange, config: &GeneratorConfig) -> RequestGenerator {
        RequestGenerator {
            handle,
            floors,
            config: config.clone(),
            worker: None,
        }
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn start(&mut self) -> std::io::Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        let (terminate_tx, terminate_rx) = cbc::bounded::<()>(1);
        let handle = self.handle.clone();
        let floors = self.floors;
        let interval = self.config.min_interval_ms..self.config.max_interval_ms;

        let join_handle = Builder::new()
            .name("request-generator".into())
            .spawn(move || {
                let mut rng = rand::rng();
                let mut produced: u64 = 0;

                loop {
                    let delay = Duration::from_millis(rng.random_range(interval.clone()));
                    match terminate_rx.recv_timeout(delay) {
                        Err(cbc::RecvTimeoutError::Timeout) => {}
                        _ => break,
                    }

                    let (pickup, destination) = random_trip(&mut rng, floors);
                    match handle.enqueue(pickup, destination) {
                        Ok(()) => {
                            produced += 1;
                            info!("Generated request #{}: {} → {}", produced, pickup, destination);
                        }
                        Err(e) => {
                            warn!("Generator stopping, enqueue failed: {}", e);
                            break;
                        }
                    }
                }

                debug!("Request generator exited after {} requests", produced);
            })?;

        self.worker = Some((terminate_tx, join_handle));
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some((terminate_tx, join_handle)) = self.worker.take() {
            let _ = terminate_tx.send(());
            if join_handle.join().is_err() {
                warn!("Request generator thread panicked");
            }
        }
    }

    /// Enqueues `count` random requests, pausing between them. Returns how many were queued.
    pub fn generate_batch(&self, count: usize) -> usize {
        let mut rng = rand::rng();
        let mut queued = 0;

        for i in 0..count {
            let (pickup, destination) = random_trip(&mut rng, self.floors);
            match self.handle.enqueue(pickup, destination) {
                Ok(()) => queued += 1,
                Err(e) => {
                    warn!("Batch request {} → {} rejected: {}", pickup, destination, e);
                    break;
                }
            }

            if i + 1 < count && !self.config.batch_pause().is_zero() {
                thread::sleep(self.config.batch_pause());
            }
        }

        info!("Enqueued batch of {} requests", queued);
        queued
    }
}

impl Drop for RequestGenerator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Draws two distinct floors. `floors` must span at least two floors.
pub(crate) fn random_trip<R: Rng>(rng: &mut R, floors: FloorRange) -> (Floor, Floor) {
    loop {
        let pickup = rng.random_range(floors.min..=floors.max);
        let destination = rng.random_range(floors.min..=floors.max);
        if pickup != destination {
            return (pickup, destination);
        }
    }
}
