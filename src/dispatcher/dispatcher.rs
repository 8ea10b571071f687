/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{Builder, JoinHandle};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::{CarConfig, Config};
use crate::dispatcher::assigner;
use crate::elevator::{Car, CarController};
use crate::request::Request;
use crate::shared::{CarId, DispatchError, Floor, FloorRange, Snapshot};

/***************************************/
/*               Enums                 */
/***************************************/
enum Event {
    RequestReceived(Request),
    Terminate,
}

/***************************************/
/*          Private structures         */
/***************************************/
#[derive(Default)]
struct DispatchStats {
    assigned: AtomicU64,
    dropped: AtomicU64,
}

struct Worker {
    name: String,
    terminate_tx: cbc::Sender<()>,
    handle: JoinHandle<()>,
}

/***************************************/
/*             Public API              */
/***************************************/

/// Cloneable enqueue endpoint, safe to use from any thread.
#[derive(Clone)]
pub struct DispatchHandle {
    request_tx: cbc::Sender<Request>,
}

impl DispatchHandle {
    /// Queues a trip. Fails without touching the queue when both floors are equal.
    pub fn enqueue(&self, pickup: Floor, destination: Floor) -> Result<(), DispatchError> {
        let request = Request::new(pickup, destination)?;
        info!("Call: {}", request);
        self.request_tx
            .send(request)
            .map_err(|_| DispatchError::Closed)
    }
}

/**
 * Owns the request queue and the cars, and runs the threads that serve them.
 *
 * Cars are added before `start`. `start` spawns one `CarController` per car plus the dispatch
 * loop, which takes requests off the queue in arrival order and hands each to the best-scoring
 * car. `stop` signals every thread and joins them.
 *
 * # Fields
 * - `floors`:          Floors every car serves.
 * - `start_floor`:     Floor new cars start on.
 * - `car_config`:      Tick and dwell handed to every controller.
 * - `cars`:            The fixed car list, in id order.
 * - `request_tx`:      Sending side of the FIFO request queue.
 * - `request_rx`:      Receiving side, drained by the dispatch loop.
 * - `stats`:           Assigned and dropped request counters.
 * - `workers`:         Running threads with their terminate channels.
 * - `started`:         Set by the first `start`.
 */
pub struct Dispatcher {
    floors: FloorRange,
    start_floor: Floor,
    car_config: CarConfig,
    cars: Vec<Car>,
    request_tx: cbc::Sender<Request>,
    request_rx: cbc::Receiver<Request>,
    stats: Arc<DispatchStats>,
    workers: Vec<Worker>,
    started: bool,
}

impl Dispatcher {
    pub fn new(config: &Config) -> Dispatcher {
        let (request_tx, request_rx) = cbc::unbounded::<Request>();

        Dispatcher {
            floors: config.building.floors(),
            start_floor: config.building.start_floor,
            car_config: config.car.clone(),
            cars: Vec::new(),
            request_tx,
            request_rx,
            stats: Arc::new(DispatchStats::default()),
            workers: Vec::new(),
            started: false,
        }
    }

    /// Creates the next car, numbered from 1. Only allowed before `start`.
    pub fn add_car(&mut self) -> Result<CarId, DispatchError> {
        if self.started {
            return Err(DispatchError::AlreadyStarted);
        }

        let id = self.cars.len() as CarId + 1;
        self.cars.push(Car::new(id, self.floors, self.start_floor));
        info!("Added car #{}", id);
        Ok(id)
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn handle(&self) -> DispatchHandle {
        DispatchHandle {
            request_tx: self.request_tx.clone(),
        }
    }

    pub fn enqueue(&self, pickup: Floor, destination: Floor) -> Result<(), DispatchError> {
        self.handle().enqueue(pickup, destination)
    }

    pub fn queue_len(&self) -> usize {
        self.request_rx.len()
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        !self.workers.is_empty()
    }

    pub fn start(&mut self) -> Result<(), DispatchError> {
        if self.started {
            return Err(DispatchError::AlreadyStarted);
        }
        self.started = true;

        if let Err(e) = self.spawn_workers() {
            self.stop();
            return Err(e);
        }

        info!("System started with {} cars", self.cars.len());
        Ok(())
    }

    /// Signals every worker and waits for it. Queued requests may be left unassigned.
    pub fn stop(&mut self) {
        if self.workers.is_empty() {
            return;
        }

        for worker in &self.workers {
            let _ = worker.terminate_tx.send(());
        }

        for worker in self.workers.drain(..) {
            if worker.handle.join().is_err() {
                warn!("Worker {} panicked", worker.name);
            } else {
                debug!("Worker {} joined", worker.name);
            }
        }

        info!("System stopped");
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            queue_len: self.request_rx.len(),
            assigned: self.stats.assigned.load(Ordering::Relaxed),
            dropped: self.stats.dropped.load(Ordering::Relaxed),
            cars: self.cars.iter().map(Car::snapshot).collect(),
        }
    }

    fn spawn_workers(&mut self) -> Result<(), DispatchError> {
        for car in &self.cars {
            let (terminate_tx, terminate_rx) = cbc::bounded::<()>(1);
            let controller = CarController::new(car.clone(), &self.car_config, terminate_rx);
            let name = format!("car-{}", car.id());
            let handle = Builder::new()
                .name(name.clone())
                .spawn(move || controller.run())?;
            self.workers.push(Worker {
                name,
                terminate_tx,
                handle,
            });
        }

        let (terminate_tx, terminate_rx) = cbc::bounded::<()>(1);
        let dispatch_loop = DispatchLoop {
            cars: self.cars.clone(),
            request_rx: self.request_rx.clone(),
            terminate_rx,
            stats: Arc::clone(&self.stats),
        };
        let handle = Builder::new()
            .name("dispatcher".into())
            .spawn(move || dispatch_loop.run())?;
        self.workers.push(Worker {
            name: "dispatcher".into(),
            terminate_tx,
            handle,
        });

        Ok(())
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Hands `request` to the best-scoring car: pickup floor first, then destination.
pub fn assign(cars: &[Car], request: &Request) -> Result<CarId, DispatchError> {
    let snapshots: Vec<_> = cars.iter().map(Car::snapshot).collect();
    let best = assigner::best_car(&snapshots, request).ok_or(DispatchError::NoCars)?;
    let car = &cars[best];

    for e in car.add_stops(&[request.pickup(), request.destination()]) {
        warn!("{}", e);
    }

    Ok(car.id())
}

/***************************************/
/*            Dispatch loop            */
/***************************************/
struct DispatchLoop {
    cars: Vec<Car>,
    request_rx: cbc::Receiver<Request>,
    terminate_rx: cbc::Receiver<()>,
    stats: Arc<DispatchStats>,
}

impl DispatchLoop {
    fn run(self) {
        info!("Dispatcher started");

        loop {
            match self.wait_for_event() {
                Event::RequestReceived(request) => self.handle_request(request),
                Event::Terminate => break,
            }
        }

        info!("Dispatcher stopped with {} requests queued", self.request_rx.len());
    }

    fn wait_for_event(&self) -> Event {
        cbc::select! {
            recv(self.terminate_rx) -> _ => Event::Terminate,
            recv(self.request_rx) -> request => match request {
                Ok(request) => Event::RequestReceived(request),
                Err(_) => Event::Terminate,
            },
        }
    }

    fn handle_request(&self, request: Request) {
        debug!("Processing {}", request);

        match assign(&self.cars, &request) {
            Ok(id) => {
                self.stats.assigned.fetch_add(1, Ordering::Relaxed);
                info!(
                    "Assigned car #{} to {} after {:.2}s",
                    id,
                    request,
                    request.waiting_time().as_secs_f64()
                );
            }
            Err(e) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Dropping request {}: {}", request, e);
            }
        }
    }
}
