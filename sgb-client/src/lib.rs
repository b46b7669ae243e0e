//! Broadcaster side of the Simple General Broadcaster
//!
//! Validates operator input, enumerates the target addresses and pushes one
//! framed message to each of them over its own TCP connection.

pub mod dispatch;
pub mod error;
pub mod input;
pub mod interactive;
pub mod observer;

pub use dispatch::{BroadcastDispatcher, DispatchReport};
pub use error::{ClientError, Result};
pub use input::{ClientInputs, RawInputs, Target};
pub use observer::{ConsoleObserver, DispatchObserver};
