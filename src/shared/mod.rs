pub mod errors;
pub mod macros;
pub mod structs;

pub use errors::CarError;
pub use errors::ConfigError;
pub use errors::DispatchError;
pub use errors::RequestError;
pub use structs::CarId;
pub use structs::CarSnapshot;
pub use structs::Direction;
pub use structs::Floor;
pub use structs::FloorRange;
pub use structs::Snapshot;
pub use structs::Status;
