/***************************************/
/*           Local modules             */
/***************************************/
use crate::request::Request;
use crate::shared::{CarSnapshot, Direction};

/***************************************/
/*          Scoring weights            */
/***************************************/
const DISTANCE_WEIGHT: i32 = 10;
const IDLE_BONUS: i32 = 50;
const ON_THE_WAY_BONUS: i32 = 30;
const LOAD_PENALTY: i32 = 5;

/***************************************/
/*             Public API              */
/***************************************/

/// Cost of sending `car` to serve `request`. Lower is better.
///
/// Distance to the pickup dominates. Idle cars get a large discount, cars already travelling
/// toward the pickup in the passenger's direction a smaller one, and every pending stop adds a
/// load penalty.
pub fn score(car: &CarSnapshot, request: &Request) -> i32 {
    let pickup = request.pickup();
    let distance = (car.floor - pickup).abs();
    let mut score = distance * DISTANCE_WEIGHT;

    if car.is_idle() {
        score -= IDLE_BONUS;
    }

    if car.direction == request.direction() {
        let on_the_way = match car.direction {
            Direction::Up => pickup >= car.floor,
            Direction::Down => pickup <= car.floor,
            Direction::Idle => false,
        };
        if on_the_way {
            score -= ON_THE_WAY_BONUS;
        }
    }

    score + car.pending_stops.len() as i32 * LOAD_PENALTY
}

/// Index of the lowest-scoring car. Ties go to the earliest car. `None` without cars.
pub fn best_car(cars: &[CarSnapshot], request: &Request) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;

    for (index, car) in cars.iter().enumerate() {
        let car_score = score(car, request);
        match best {
            Some((_, best_score)) if car_score >= best_score => {}
            _ => best = Some((index, car_score)),
        }
    }

    best.map(|(index, _)| index)
}
