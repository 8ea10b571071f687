pub mod generator;
pub mod request;
pub mod request_tests;

pub use generator::RequestGenerator;
pub use request::Request;
