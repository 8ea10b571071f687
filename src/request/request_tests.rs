/*
 * Unit tests for requests and the request generator
 *
 * The unit tests follows the Arrange, Act, Assert pattern. Generator tests run against a
 * dispatcher that is never started, so queued requests stay put and can be counted.
 *
 * Tests:
 * - test_request_new_and_direction
 * - test_request_rejects_same_floor
 * - test_waiting_time_grows
 * - test_random_trip_is_distinct_and_in_range
 * - test_generate_batch_fills_queue
 * - test_generator_stops_promptly
 * - test_generator_thread_produces_requests
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod request_tests {
    use crate::config::{Config, GeneratorConfig};
    use crate::dispatcher::Dispatcher;
    use crate::request::generator::random_trip;
    use crate::request::{Request, RequestGenerator};
    use crate::shared::Direction::{Down, Up};
    use crate::shared::{FloorRange, RequestError};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::thread::sleep;
    use std::time::{Duration, Instant};

    fn setup_generator(dispatcher: &Dispatcher, min_interval_ms: u64, max_interval_ms: u64) -> RequestGenerator {
        let config = GeneratorConfig {
            min_interval_ms,
            max_interval_ms,
            batch_pause_ms: 0,
        };
        RequestGenerator::new(dispatcher.handle(), FloorRange::new(0, 9), &config)
    }

    #[test]
    fn test_request_new_and_direction() {
        // Act
        let up = Request::new(1, 7).unwrap();
        let down = Request::new(5, 2).unwrap();

        // Assert
        assert_eq!((up.pickup(), up.destination()), (1, 7));
        assert_eq!(up.direction(), Up);
        assert_eq!(down.direction(), Down);
        assert_eq!(down.to_string(), "5 → 2");
    }

    #[test]
    fn test_request_rejects_same_floor() {
        assert_eq!(Request::new(4, 4), Err(RequestError::SameFloor(4)));
    }

    #[test]
    fn test_waiting_time_grows() {
        // Arrange
        let request = Request::new(0, 3).unwrap();
        let first = request.waiting_time();

        // Act
        sleep(Duration::from_millis(5));

        // Assert
        assert!(request.waiting_time() >= first + Duration::from_millis(5));
    }

    #[test]
    fn test_random_trip_is_distinct_and_in_range() {
        // Arrange
        let floors = FloorRange::new(0, 9);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            // Act
            let (pickup, destination) = random_trip(&mut rng, floors);

            // Assert
            assert_ne!(pickup, destination);
            assert!(floors.contains(pickup));
            assert!(floors.contains(destination));
        }

        // Two floors only leaves two possible trips
        let (pickup, destination) = random_trip(&mut rng, FloorRange::new(3, 4));
        assert_eq!(pickup + destination, 7);
    }

    #[test]
    fn test_generate_batch_fills_queue() {
        // Arrange
        let dispatcher = Dispatcher::new(&Config::default());
        let generator = setup_generator(&dispatcher, 10_000, 20_000);

        // Act
        let queued = generator.generate_batch(5);

        // Assert
        assert_eq!(queued, 5);
        assert_eq!(dispatcher.queue_len(), 5);
        assert_eq!(generator.generate_batch(0), 0);
    }

    #[test]
    fn test_generator_stops_promptly() {
        // Arrange: the first request would come after at least 10 seconds
        let dispatcher = Dispatcher::new(&Config::default());
        let mut generator = setup_generator(&dispatcher, 10_000, 20_000);

        // Act
        generator.start().unwrap();
        assert!(generator.is_running());
        let started = Instant::now();
        generator.stop();

        // Assert
        assert!(!generator.is_running());
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(dispatcher.queue_len(), 0);

        // Stopping again is harmless
        generator.stop();
    }

    #[test]
    fn test_generator_thread_produces_requests() {
        // Arrange
        let dispatcher = Dispatcher::new(&Config::default());
        let mut generator = setup_generator(&dispatcher, 1, 2);

        // Act
        generator.start().unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while dispatcher.queue_len() < 3 && Instant::now() < deadline {
            sleep(Duration::from_millis(2));
        }
        generator.stop();

        // Assert
        assert!(dispatcher.queue_len() >= 3);
    }
}
