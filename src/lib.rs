//! # Overview
//!
//! `midiwire` is an incremental decoder for raw MIDI byte streams: the undelimited bytes that
//! arrive over a DIN cable, a UART, or any other plain serial transport.
//!
//! Usage is as simple as:
//!
//! ```rust
//! use midiwire::{ChannelVoice, Parser};
//!
//! let mut parser = Parser::new();
//!
//! // Feed the stream byte by byte, as it arrives
//! let mut notes = Vec::new();
//! parser.feed_slice(&[0x99, 0x2A, 0x5B, 0x2A, 0x00], |event| {
//!     if let Some((channel, msg)) = event.as_channel() {
//!         notes.push((channel, msg));
//!     }
//! });
//!
//! assert_eq!(notes.len(), 2);
//! assert!(matches!(notes[0].1, ChannelVoice::NoteOn { .. }));
//! assert!(matches!(notes[1].1, ChannelVoice::NoteOff { .. }));
//! ```
//!
//! The [`Parser`](struct.Parser.html) struct is the main type in the crate.
//! Every byte fed to it yields either nothing or one complete [`Event`](enum.Event.html), with
//! no allocation and a bounded amount of work, so it is fit for interrupt handlers and
//! real-time audio threads.
//! All the quirks of the wire format are handled internally: running status, System Real-Time
//! bytes spliced into the middle of other messages, zero-velocity `NoteOn` messages carrying
//! `NoteOff` meaning, and System Exclusive transfers of arbitrary length.
//!
//! # Streams and packets
//!
//! The `Parser` is for undelimited streams.
//! When a transport already hands out whole delimited messages (as OS-level MIDI APIs usually
//! do), there is no stream state to track, and the standalone
//! [`Event::parse`](enum.Event.html#method.parse) method decodes a packet in one call.
//!
//! # About lifetimes
//!
//! Events are plain `Copy` values, except for System Exclusive events: their payload borrows
//! the parser's internal buffer, which is reused for the next transfer.
//! Copy the payload out while the event is live, or use
//! [`Event::to_static`](enum.Event.html#method.to_static) to detach the event (dropping the
//! payload).
//!
//! The buffer itself is pluggable through the [`Buffer`](trait.Buffer.html) trait: the default
//! is a 128-byte stack buffer, the [`stack_buffer!`](macro.stack_buffer.html) macro defines
//! fixed buffers of other sizes, and a `Vec<u8>` buffer removes the size limit altogether.
//! A transfer that outgrows its buffer is dropped whole.
//!
//! # About features
//!
//! The mode in which the crate works is configurable through the use of cargo features.
//! Three optional features are available: `std`, `alloc` and `strict`.
//! Only `std` is enabled by default.
//!
//! - The `std` feature
//!
//!   This feature implements the `std::error::Error` trait for the crate's error type.
//!   Disabling it with `default-features = false` makes the crate `no_std`.
//!
//! - The `alloc` feature
//!
//!   This feature implements [`Buffer`](trait.Buffer.html) for `Vec<u8>`, so System Exclusive
//!   payloads can grow without a limit.
//!   It is implied by `std`, and is the only part of the crate that ever allocates.
//!
//! - The `strict` feature
//!
//!   By default the decoder plows through non-standard input: data bytes with their top bit
//!   set have the offending bit masked away.
//!   By enabling the `strict` feature, [`Event::parse`](enum.Event.html#method.parse) rejects
//!   such packets with errors of the kind `ErrorKind::Malformed` instead.
//!   The streaming `Parser` is unaffected, since it never fails.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

macro_rules! bail {
    ($err:expr) => {{
        return Err($err.into());
    }};
}
macro_rules! ensure {
    ($cond:expr, $err:expr) => {{
        if !$cond {
            bail!($err)
        }
    }};
}

/// All of the errors this crate produces.
#[macro_use]
mod error;

mod prelude {
    pub(crate) use crate::{
        error::{ErrorKind, Result, StdResult},
        primitive::{u14, u4, u7},
    };
}

mod buffer;
mod event;
mod parser;
mod primitive;

pub use crate::{
    buffer::{Buffer, DefaultBuffer},
    error::{Error, ErrorKind, Result},
    event::{ChannelVoice, Event, PitchBend, SystemCommon, SystemRealtime},
    parser::Parser,
};

/// Exotically-sized integers used by the MIDI standard.
pub mod num {
    pub use crate::primitive::{u14, u4, u7};
}

#[cfg(test)]
mod test;
