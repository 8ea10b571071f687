pub mod assigner;
pub mod dispatcher;
pub mod dispatcher_tests;

pub use dispatcher::DispatchHandle;
pub use dispatcher::Dispatcher;
