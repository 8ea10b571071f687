/*
 * Unit tests for the dispatcher
 *
 * The unit tests follows the Arrange, Act, Assert pattern. Threaded tests run with
 * millisecond ticks and poll the snapshot until a deadline.
 *
 * Tests:
 * - test_enqueue_rejects_same_floor
 * - test_add_car_assigns_sequential_ids
 * - test_lifecycle_errors
 * - test_assign_pushes_both_floors_to_one_car
 * - test_assign_prefers_idle_car
 * - test_assign_without_cars
 * - test_assign_out_of_range_floor_is_ignored
 * - test_dispatcher_serves_request_end_to_end
 * - test_dispatcher_drops_request_without_cars
 * - test_concurrent_enqueue_from_cloned_handles
 * - test_requests_are_assigned_in_arrival_order
 * - test_snapshot_reports_cars_and_queue
 * - test_enqueue_after_dispatcher_dropped
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod dispatcher_tests {
    use crate::config::Config;
    use crate::dispatcher::dispatcher::assign;
    use crate::dispatcher::Dispatcher;
    use crate::elevator::car::CarState;
    use crate::elevator::Car;
    use crate::request::Request;
    use crate::shared::Direction::{Idle, Up};
    use crate::shared::Status::{Moving, Stopped};
    use crate::shared::{DispatchError, FloorRange, RequestError, Snapshot};
    use std::collections::BTreeSet;
    use std::thread::{sleep, spawn};
    use std::time::{Duration, Instant};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn setup_config() -> Config {
        let mut config = Config::default();
        config.car.tick_ms = 5;
        config.car.door_dwell_ms = 10;
        config
    }

    fn setup_cars(count: u32) -> Vec<Car> {
        (1..=count)
            .map(|id| Car::new(id, FloorRange::new(0, 9), 1))
            .collect()
    }

    fn wait_for<F: Fn(&Snapshot) -> bool>(dispatcher: &Dispatcher, condition: F) -> bool {
        let deadline = Instant::now() + TIMEOUT;
        while Instant::now() < deadline {
            if condition(&dispatcher.snapshot()) {
                return true;
            }
            sleep(Duration::from_millis(2));
        }
        condition(&dispatcher.snapshot())
    }

    #[test]
    fn test_enqueue_rejects_same_floor() {
        // Arrange
        let dispatcher = Dispatcher::new(&setup_config());
        dispatcher.enqueue(1, 2).unwrap();

        // Act
        let result = dispatcher.enqueue(3, 3);

        // Assert
        assert!(matches!(
            result,
            Err(DispatchError::InvalidRequest(RequestError::SameFloor(3)))
        ));
        assert_eq!(dispatcher.queue_len(), 1);
    }

    #[test]
    fn test_add_car_assigns_sequential_ids() {
        // Arrange
        let mut dispatcher = Dispatcher::new(&setup_config());

        // Act
        let ids: Vec<_> = (0..3).map(|_| dispatcher.add_car().unwrap()).collect();

        // Assert
        assert_eq!(ids, vec![1, 2, 3]);
        let cars = dispatcher.cars();
        assert_eq!(cars.len(), 3);
        assert!(cars.iter().all(|car| car.current_floor() == 1 && car.snapshot().is_idle()));
    }

    #[test]
    fn test_lifecycle_errors() {
        // Arrange
        let mut dispatcher = Dispatcher::new(&setup_config());
        dispatcher.add_car().unwrap();

        // Act
        dispatcher.start().unwrap();
        let add_after_start = dispatcher.add_car();
        let second_start = dispatcher.start();

        // Assert
        assert!(dispatcher.is_running());
        assert!(matches!(add_after_start, Err(DispatchError::AlreadyStarted)));
        assert!(matches!(second_start, Err(DispatchError::AlreadyStarted)));
        assert_eq!(dispatcher.cars().len(), 1);

        // Cleanup, stopping twice is harmless
        dispatcher.stop();
        dispatcher.stop();
        assert!(!dispatcher.is_running());
    }

    #[test]
    fn test_assign_pushes_both_floors_to_one_car() {
        // Arrange
        let cars = setup_cars(2);
        let request = Request::new(5, 2).unwrap();

        // Act
        let winner = assign(&cars, &request).unwrap();

        // Assert: identical idle cars, the first one wins
        assert_eq!(winner, 1);
        assert_eq!(cars[0].pending_stops(), vec![2, 5]);
        assert!(cars[1].pending_stops().is_empty());
    }

    #[test]
    fn test_assign_prefers_idle_car() {
        // Arrange
        let cars = setup_cars(2);
        cars[0].test_set_state(CarState::new(0));
        cars[1].test_set_state(CarState {
            floor: 9,
            direction: Up,
            status: Moving,
            stops: BTreeSet::from([9]),
        });
        let request = Request::new(1, 3).unwrap();

        // Act
        let winner = assign(&cars, &request).unwrap();

        // Assert
        assert_eq!(winner, 1);
        assert_eq!(cars[0].pending_stops(), vec![1, 3]);
        assert_eq!(cars[1].pending_stops(), vec![9]);
    }

    #[test]
    fn test_assign_without_cars() {
        let request = Request::new(2, 4).unwrap();
        assert!(matches!(assign(&[], &request), Err(DispatchError::NoCars)));
    }

    #[test]
    fn test_assign_out_of_range_floor_is_ignored() {
        // Arrange
        let cars = setup_cars(1);
        let request = Request::new(3, 15).unwrap();

        // Act
        let winner = assign(&cars, &request);

        // Assert: the valid pickup is kept, the bad destination dropped
        assert_eq!(winner.unwrap(), 1);
        assert_eq!(cars[0].pending_stops(), vec![3]);
    }

    #[test]
    fn test_dispatcher_serves_request_end_to_end() {
        // Arrange
        let mut dispatcher = Dispatcher::new(&setup_config());
        dispatcher.add_car().unwrap();
        dispatcher.enqueue(5, 2).unwrap();

        // Act
        dispatcher.start().unwrap();

        // Assert
        assert!(wait_for(&dispatcher, |snapshot| {
            let car = &snapshot.cars[0];
            snapshot.queue_len == 0
                && snapshot.assigned == 1
                && car.floor == 5
                && car.is_idle()
                && car.pending_stops.is_empty()
        }));
        assert_eq!(dispatcher.snapshot().dropped, 0);

        // Cleanup
        dispatcher.stop();
    }

    #[test]
    fn test_dispatcher_drops_request_without_cars() {
        // Arrange
        let mut dispatcher = Dispatcher::new(&setup_config());
        dispatcher.enqueue(2, 4).unwrap();
        assert_eq!(dispatcher.queue_len(), 1);

        // Act
        dispatcher.start().unwrap();

        // Assert
        assert!(wait_for(&dispatcher, |snapshot| {
            snapshot.queue_len == 0 && snapshot.dropped == 1
        }));
        assert_eq!(dispatcher.snapshot().assigned, 0);

        // The loop keeps serving after a drop
        dispatcher.enqueue(4, 2).unwrap();
        assert!(wait_for(&dispatcher, |snapshot| snapshot.dropped == 2));

        // Cleanup
        dispatcher.stop();
    }

    #[test]
    fn test_concurrent_enqueue_from_cloned_handles() {
        // Arrange
        let mut dispatcher = Dispatcher::new(&setup_config());
        dispatcher.add_car().unwrap();
        dispatcher.add_car().unwrap();

        // Act: 8 producers with 50 trips each, queued before the loop runs
        let producers: Vec<_> = (0..8)
            .map(|_| {
                let handle = dispatcher.handle();
                spawn(move || {
                    for i in 0..50 {
                        handle.enqueue(i % 9, 9).unwrap();
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }
        assert_eq!(dispatcher.queue_len(), 400);
        dispatcher.start().unwrap();

        // Assert
        assert!(wait_for(&dispatcher, |snapshot| {
            snapshot.queue_len == 0 && snapshot.assigned == 400
        }));
        assert_eq!(dispatcher.snapshot().dropped, 0);

        // Cleanup
        dispatcher.stop();
    }

    #[test]
    fn test_requests_are_assigned_in_arrival_order() {
        // Arrange: two identical idle cars that barely move during the test. Whichever
        // request is taken first ties and goes to car #1, which then loses to car #2.
        let mut config = setup_config();
        config.car.tick_ms = 60_000;
        config.car.door_dwell_ms = 60_000;
        let mut dispatcher = Dispatcher::new(&config);
        dispatcher.add_car().unwrap();
        dispatcher.add_car().unwrap();
        dispatcher.enqueue(2, 3).unwrap();
        dispatcher.enqueue(7, 8).unwrap();

        // Act
        dispatcher.start().unwrap();

        // Assert
        assert!(wait_for(&dispatcher, |snapshot| snapshot.assigned == 2));
        let snapshot = dispatcher.snapshot();
        assert_eq!(snapshot.cars[0].pending_stops, vec![2, 3]);
        assert_eq!(snapshot.cars[1].pending_stops, vec![7, 8]);

        // Cleanup
        dispatcher.stop();
    }

    #[test]
    fn test_snapshot_reports_cars_and_queue() {
        // Arrange
        let mut dispatcher = Dispatcher::new(&setup_config());
        dispatcher.add_car().unwrap();
        dispatcher.add_car().unwrap();
        dispatcher.enqueue(0, 9).unwrap();
        dispatcher.enqueue(9, 0).unwrap();

        // Act
        let snapshot = dispatcher.snapshot();

        // Assert
        assert_eq!(snapshot.queue_len, 2);
        assert_eq!(snapshot.assigned, 0);
        assert_eq!(snapshot.cars.len(), 2);
        assert_eq!(snapshot.cars[1].id, 2);
        assert_eq!(snapshot.cars[1].floor, 1);
        assert_eq!(snapshot.cars[1].status, Stopped);
        assert_eq!(snapshot.cars[1].direction, Idle);

        let text = snapshot.to_string();
        assert!(text.contains("queued: 2"));
        assert!(text.contains("car #2 at floor 1"));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["queueLength"], 2);
        assert_eq!(json["cars"][0]["status"], "stopped");
        assert_eq!(json["cars"][0]["direction"], "idle");
    }

    #[test]
    fn test_enqueue_after_dispatcher_dropped() {
        // Arrange
        let dispatcher = Dispatcher::new(&setup_config());
        let handle = dispatcher.handle();

        // Act
        drop(dispatcher);

        // Assert
        assert!(matches!(handle.enqueue(1, 2), Err(DispatchError::Closed)));
        assert!(matches!(
            handle.enqueue(2, 2),
            Err(DispatchError::InvalidRequest(_))
        ));
    }
}
