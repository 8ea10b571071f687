pub mod car;
pub mod fsm;

pub use car::Car;
pub use fsm::CarController;
