//! The incremental decoder that turns a raw, undelimited MIDI byte stream into events.
//!
//! This sort of stream is what travels over a DIN cable or a UART: bytes arrive one at a time
//! with no packet boundaries, messages may omit their status byte (running status), System
//! Real-Time bytes may be spliced into the middle of any other message, and System Exclusive
//! transfers run until their closing byte.
//!
//! The [`Parser`] handles all of it with a fixed amount of state and a bounded amount of work
//! per byte, so it can sit directly in a receive interrupt handler.

use crate::{
    buffer::{Buffer, DefaultBuffer},
    event::{ChannelVoice, Event, SystemCommon, SystemRealtime},
    prelude::*,
};

/// Where the decoder stands in between bytes.
///
/// The data-collection phases carry the message they are collecting, so a phase value is the
/// whole record of the partial message and impossible combinations cannot be represented.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Phase {
    /// In between messages.
    Idle,
    /// A channel voice status byte arrived and its first data byte is pending.
    AwaitData0 { status: u8 },
    /// One more data byte completes the channel voice message.
    AwaitData1 { status: u8, data0: u7 },
    /// Inside a System Exclusive transfer, accumulating payload bytes.
    InSysEx,
}

/// A status byte abandons whatever partial message was in flight, before the byte itself is
/// interpreted.
///
/// End of Exclusive is the one status byte with meaning inside an exclusive transfer, so it is
/// exempt; any other status byte interrupting a transfer kills it, as the MIDI spec requires.
#[inline]
fn aborted(phase: Phase, byte: u8) -> Phase {
    match phase {
        Phase::InSysEx if byte == 0xF7 => phase,
        _ if byte & 0x80 != 0 => Phase::Idle,
        _ => phase,
    }
}

/// A streaming MIDI decoder: feed it wire bytes one at a time and get complete events back.
///
/// Every byte fed in produces either nothing or exactly one [`Event`]. Decoding never
/// backtracks, never allocates, and does a bounded amount of work per byte, so a parser can be
/// fed from an interrupt handler or a real-time audio thread.
///
/// ```rust
/// use midiwire::{ChannelVoice, Event, Parser};
///
/// let mut parser = Parser::new();
/// assert_eq!(parser.feed(0x99), None);
/// assert_eq!(parser.feed(0x2A), None);
/// match parser.feed(0x5B) {
///     Some(Event::Channel { channel, msg: ChannelVoice::NoteOn { key, vel } }) => {
///         assert_eq!(channel, 9);
///         assert_eq!(key, 0x2A);
///         assert_eq!(vel, 0x5B);
///     }
///     other => panic!("unexpected event: {:?}", other),
/// }
/// ```
///
/// # Stream recovery
///
/// Malformed input never produces an error, only silence: a data byte with no status context is
/// dropped, a status byte arriving mid-message abandons the partial message and starts a new
/// one, and a System Exclusive transfer that outgrows its buffer is discarded whole. A status
/// byte other than End of Exclusive arriving inside an exclusive transfer also aborts it, as
/// the MIDI spec requires.
///
/// System Real-Time bytes (`0xF8..=0xFF`) are the exception to everything: they decode to their
/// event immediately wherever they appear, leaving any message in progress undisturbed.
#[derive(Clone, Debug)]
pub struct Parser<B = DefaultBuffer> {
    phase: Phase,
    //Last channel voice status byte, reused when data arrives with no status of its own
    //(running status)
    running_status: Option<u8>,
    sysex: B,
}
impl Parser {
    /// Create a fresh parser with the default 128-byte System Exclusive buffer.
    ///
    /// This is a `const fn`, so a parser can live in a `static` and be fed from an interrupt
    /// handler.
    #[inline]
    pub const fn new() -> Parser {
        Parser {
            phase: Phase::Idle,
            running_status: None,
            sysex: DefaultBuffer::new(),
        }
    }
}
impl<B: Buffer + Default> Default for Parser<B> {
    #[inline]
    fn default() -> Parser<B> {
        Parser::with_buffer(B::default())
    }
}
impl<B: Buffer> Parser<B> {
    /// Create a parser that accumulates System Exclusive payloads into the given buffer.
    ///
    /// The buffer capacity decides the largest payload the parser will deliver: a transfer that
    /// outgrows it is silently dropped, closing byte included. Use the
    /// [`stack_buffer!`](crate::stack_buffer) macro to define fixed-capacity buffer types.
    #[inline]
    pub fn with_buffer(mut buf: B) -> Parser<B> {
        buf.clear();
        Parser {
            phase: Phase::Idle,
            running_status: None,
            sysex: buf,
        }
    }

    /// Decode one byte of the stream, returning the event it completes, if any.
    ///
    /// The returned event borrows the parser: a System Exclusive payload points into the
    /// parser's own buffer, and must be copied out (or detached with
    /// [`Event::to_static`]) before the next byte is fed.
    ///
    /// ```rust
    /// use midiwire::{Event, Parser, SystemCommon};
    /// use midiwire::num::u7;
    ///
    /// let mut parser = Parser::new();
    /// let mut payload = None;
    /// for &byte in &[0xF0, 0x01, 0x02, 0x03, 0xF7] {
    ///     if let Some(Event::Common(SystemCommon::SysEx(data))) = parser.feed(byte) {
    ///         payload = Some(u7::slice_as_int(data).to_vec());
    ///     }
    /// }
    /// assert_eq!(payload.as_deref(), Some(&[0x01, 0x02, 0x03][..]));
    /// ```
    #[inline]
    pub fn feed(&mut self, byte: u8) -> Option<Event<'_>> {
        if byte >= 0xF8 {
            //System Realtime
            //These single-byte events are time-sensitive and can appear even in between the
            //status and data bytes of other messages. The event is decoded from the lone byte
            //and the rest of the machine is left exactly as it was.
            return Some(Event::Realtime(SystemRealtime::from_status(byte)));
        }
        self.phase = aborted(self.phase, byte);
        match self.phase {
            Phase::Idle => {
                if byte & 0x80 != 0 {
                    self.begin(byte)
                } else {
                    //A data byte with no status of its own continues the last channel voice
                    //message (running status), or means nothing at all
                    match self.running_status {
                        Some(status) => self.first_data(status, u7::from_int_lossy(byte)),
                        None => None,
                    }
                }
            }
            Phase::AwaitData0 { status } => self.first_data(status, u7::from_int_lossy(byte)),
            Phase::AwaitData1 { status, data0 } => {
                self.phase = Phase::Idle;
                let data1 = u7::from_int_lossy(byte);
                let (channel, msg) = ChannelVoice::read(status, [data0, data1]);
                Some(Event::Channel { channel, msg })
            }
            Phase::InSysEx => {
                if byte == 0xF7 {
                    //End of Exclusive: the accumulated payload becomes the event
                    self.phase = Phase::Idle;
                    let payload = u7::slice_from_int(self.sysex.as_slice());
                    Some(Event::Common(SystemCommon::SysEx(payload)))
                } else {
                    //Only data bytes reach here: status bytes either close or abort the
                    //transfer before dispatch
                    match self.sysex.push(byte) {
                        Ok(()) => None,
                        Err(()) => {
                            //The payload outgrew the buffer: drop the whole transfer
                            self.phase = Phase::Idle;
                            None
                        }
                    }
                }
            }
        }
    }

    /// A status byte seen from `Idle` opens a new message.
    fn begin(&mut self, status: u8) -> Option<Event<'static>> {
        if status < 0xF0 {
            //Channel voice: remember the status and wait for its data bytes
            self.running_status = Some(status);
            self.phase = Phase::AwaitData0 { status };
            None
        } else if status == 0xF0 {
            //Start accumulating a System Exclusive transfer
            self.sysex.clear();
            self.phase = Phase::InSysEx;
            None
        } else {
            //Every other System Common message is a single byte, emitted on the spot.
            //System Common statuses do not touch running status.
            Some(Event::Common(SystemCommon::from_status(status)))
        }
    }

    /// First data byte of a channel voice message, fresh or under running status.
    #[inline]
    fn first_data(&mut self, status: u8, data0: u7) -> Option<Event<'static>> {
        if ChannelVoice::data_len(status) == 1 {
            //ProgramChange and ChannelPressure are complete after a single data byte
            self.phase = Phase::Idle;
            let (channel, msg) = ChannelVoice::read(status, [data0, u7::new(0)]);
            Some(Event::Channel { channel, msg })
        } else {
            self.phase = Phase::AwaitData1 { status, data0 };
            None
        }
    }

    /// Feed a whole slice of bytes, invoking `handle_ev` for each completed event.
    ///
    /// Calling `feed_slice` with many small slices is equivalent to calling it with one large
    /// concatenation of them all.
    pub fn feed_slice(&mut self, bytes: &[u8], mut handle_ev: impl FnMut(Event)) {
        for &byte in bytes {
            if let Some(ev) = self.feed(byte) {
                handle_ev(ev);
            }
        }
    }

    /// Forget everything: any half-assembled message, any partial System Exclusive payload, and
    /// the running status.
    ///
    /// Meant for stream boundaries, such as a transport reconnect. The next byte fed is
    /// interpreted as if the parser were freshly created.
    #[inline]
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.running_status = None;
        self.sysex.clear();
    }
}
