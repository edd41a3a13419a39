//! Line-oriented JSON protocol.
//!
//! ```text
//!  Transport ─▶ SerialLink ─▶ Dispatcher ─▶ PinRegistry / LoggingScheduler
//!                   ▲              │
//!                   └── Response ◀─┘
//! ```
//!
//! One JSON object per line in both directions.  Requests carry `command`
//! and `job`; replies are `RX_<CMD>`, per-command failures `ERR_<CMD>`, and
//! failures that cannot be tied to a command plain `ERROR`.

pub mod command;
pub mod engine;
pub mod link;
pub mod message;
pub mod response;
pub mod transport;

pub use command::Command;
pub use engine::{Dispatcher, Rejection};
pub use link::{Inbound, SerialLink};
pub use response::Response;
pub use transport::{BufferTransport, Transport};
