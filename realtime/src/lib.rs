//! StayMate real-time events over STOMP 1.2 on a WebSocket.
//!
//! - [`frame`]: STOMP frame codec.
//! - [`events`]: broker destinations and payload decoding.
//! - [`RealtimeClient`]: background connection with reconnect, driven
//!   through a [`RealtimeHandle`].

mod client;
pub mod events;
pub mod frame;

pub use client::{RealtimeClient, RealtimeConfig, RealtimeError, RealtimeHandle, TokenSource};
pub use events::{DecodeError, RealtimeEvent};
pub use frame::{Command, Frame, FrameDecoder, FrameError, Incoming};
