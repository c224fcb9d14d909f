//! The event model: complete MIDI messages, as delivered by the streaming
//! [`Parser`](crate::Parser) or decoded from standalone packets.
//!
//! The top-level [`Event`] type splits along the three families of the MIDI wire format:
//! channel voice messages, System Common messages (including System Exclusive transfers), and
//! the single-byte System Real-Time messages.

use crate::prelude::*;

/// A complete MIDI message decoded from the wire.
///
/// Obtained either incrementally from [`Parser::feed`](crate::Parser::feed) or in one go from
/// [`Event::parse`].
///
/// The lifetime covers the System Exclusive payload, which borrows the parser's internal buffer
/// when streaming. Use [`to_static`](Event::to_static) to detach an event from that borrow
/// (dropping the payload), or copy the payload out while the event is live.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Event<'a> {
    /// A MIDI message associated with a channel, carrying musical data.
    ///
    /// Status byte in the range `0x80..=0xEF`.
    Channel {
        /// The MIDI channel that this message is associated with.
        channel: u4,
        /// The message type and associated data.
        msg: ChannelVoice,
    },
    /// A System Common message, as defined by the MIDI spec, including System Exclusive.
    ///
    /// Status byte in the range `0xF0..=0xF7`.
    Common(SystemCommon<'a>),
    /// A one-byte System Real-Time message.
    ///
    /// Status byte in the range `0xF8..=0xFF`.
    Realtime(SystemRealtime),
}
impl<'a> Event<'a> {
    /// Decode a complete MIDI message from its raw bytes.
    ///
    /// This method can be used to decode the delimited packets handed out by OS MIDI APIs (ie. a
    /// status byte in the range `0x80..=0xFF` followed by its data bytes). For undelimited byte
    /// streams, where messages rely on running status and may be interleaved with real-time
    /// bytes, use the [`Parser`](crate::Parser) type instead.
    ///
    /// ```rust
    /// use midiwire::{ChannelVoice, Event};
    ///
    /// let event = Event::parse(&[0x91, 0x3C, 0x40]).unwrap();
    /// match event {
    ///     Event::Channel { channel, msg: ChannelVoice::NoteOn { key, vel } } => {
    ///         assert_eq!(channel, 1);
    ///         assert_eq!(key, 0x3C);
    ///         assert_eq!(vel, 0x40);
    ///     }
    ///     other => panic!("unexpected event: {:?}", other),
    /// }
    /// ```
    pub fn parse(raw: &'a [u8]) -> Result<Event<'a>> {
        let (&status, data) = raw
            .split_first()
            .ok_or(err_invalid!("empty midi packet"))?;
        match status {
            0x80..=0xEF => {
                let data = ChannelVoice::read_data(status, data)?;
                let (channel, msg) = ChannelVoice::read(status, data);
                Ok(Event::Channel { channel, msg })
            }
            0xF0 => {
                //The closing EOX byte is packet framing, not payload
                let data = match data.split_last() {
                    Some((&0xF7, payload)) => payload,
                    _ => data,
                };
                let payload = if cfg!(feature = "strict") {
                    u7::slice_try_from_int(data)
                        .ok_or(err_malformed!("sysex payload byte with top bit set"))?
                } else {
                    //Truncate at the first byte outside the data range
                    u7::slice_from_int(data)
                };
                Ok(Event::Common(SystemCommon::SysEx(payload)))
            }
            0xF1..=0xF7 => Ok(Event::Common(SystemCommon::from_status(status))),
            0xF8..=0xFF => Ok(Event::Realtime(SystemRealtime::from_status(status))),
            _ => bail!(err_invalid!("packet starts with a data byte")),
        }
    }

    /// The channel and voice message, if this is a channel voice event.
    #[inline]
    pub fn as_channel(&self) -> Option<(u4, ChannelVoice)> {
        match *self {
            Event::Channel { channel, msg } => Some((channel, msg)),
            _ => None,
        }
    }

    /// Remove any lifetimed data from this event to create an `Event` with `'static` lifetime
    /// that can be stored and moved everywhere, solving borrow checker issues.
    ///
    /// WARNING: any System Exclusive payload will be replaced by an empty one.
    pub fn to_static(&self) -> Event<'static> {
        use self::Event::*;
        match *self {
            Channel { channel, msg } => Channel { channel, msg },
            Common(common) => Common(common.to_static()),
            Realtime(realtime) => Realtime(realtime),
        }
    }
}

/// A channel voice message, the musical payload of [`Event::Channel`].
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum ChannelVoice {
    /// Stop playing a note.
    NoteOff {
        /// The MIDI key to stop playing.
        key: u7,
        /// The velocity with which to stop playing it.
        vel: u7,
    },
    /// Start playing a note.
    ///
    /// By convention a `NoteOn` with a velocity of 0 means the same as a `NoteOff`, and this
    /// crate decodes it as one, so the `vel` of a decoded `NoteOn` is never 0.
    NoteOn {
        /// The key to start playing.
        key: u7,
        /// The velocity (strength) with which to press it.
        vel: u7,
    },
    /// Modify the pressure of a single note after it has been played.
    PolyPressure {
        /// The key for which to modify the pressure.
        key: u7,
        /// The new pressure for the key.
        pressure: u7,
    },
    /// Modify the value of a MIDI controller.
    ControlChange {
        /// The controller to modify.
        ///
        /// See the MIDI spec for the meaning of each index.
        controller: u7,
        /// The value to set it to.
        value: u7,
    },
    /// Change the program (also known as instrument) for a channel.
    ProgramChange {
        /// The new program (instrument) to use for the channel.
        program: u7,
    },
    /// Modify the pressure of a whole channel at once, without starting new notes.
    ChannelPressure {
        /// The new pressure for all notes currently playing in the channel.
        pressure: u7,
    },
    /// Set the pitch bend value for the entire channel.
    PitchBend {
        /// The new pitch-bend value.
        bend: PitchBend,
    },
}
impl ChannelVoice {
    /// The number of data bytes that follow each channel voice status.
    pub(crate) fn data_len(status: u8) -> usize {
        const LENGTH_BY_STATUS: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 2, 2, 2, 2, 1, 1, 2, 0];
        LENGTH_BY_STATUS[(status >> 4) as usize] as usize
    }

    /// Extract the data bytes of a channel voice packet from the raw bytes after the status.
    pub(crate) fn read_data(status: u8, raw: &[u8]) -> Result<[u7; 2]> {
        let len = Self::data_len(status);
        ensure!(raw.len() >= len, err_invalid!("truncated midi packet"));
        Ok(match len {
            1 => [u7::from_data_byte(raw[0])?, u7::new(0)],
            _ => [u7::from_data_byte(raw[0])?, u7::from_data_byte(raw[1])?],
        })
    }

    /// Receives the status byte and data bytes separately.
    ///
    /// Panics if `status` is not a channel voice status (`0x80..=0xEF`).
    pub(crate) fn read(status: u8, data: [u7; 2]) -> (u4, ChannelVoice) {
        let channel = u4::from(status);
        let msg = match status >> 4 {
            0x8 => ChannelVoice::NoteOff {
                key: data[0],
                vel: data[1],
            },
            0x9 => {
                if data[1] == 0 {
                    //A zero-velocity NoteOn carries NoteOff meaning
                    ChannelVoice::NoteOff {
                        key: data[0],
                        vel: data[1],
                    }
                } else {
                    ChannelVoice::NoteOn {
                        key: data[0],
                        vel: data[1],
                    }
                }
            }
            0xA => ChannelVoice::PolyPressure {
                key: data[0],
                pressure: data[1],
            },
            0xB => ChannelVoice::ControlChange {
                controller: data[0],
                value: data[1],
            },
            0xC => ChannelVoice::ProgramChange { program: data[0] },
            0xD => ChannelVoice::ChannelPressure { pressure: data[0] },
            0xE => {
                //Note the little-endian order: the least significant 7 bits arrive first
                let lsb = data[0].as_int() as u16;
                let msb = data[1].as_int() as u16;
                ChannelVoice::PitchBend {
                    bend: PitchBend(u14::from(msb << 7 | lsb)),
                }
            }
            _ => panic!("decoded a channel voice message before checking that status is in range"),
        };
        (channel, msg)
    }
}

/// The value of a pitch bend, represented as 14 bits.
///
/// A value of `0x0000` indicates full bend downwards.
/// A value of `0x2000` indicates no bend.
/// A value of `0x3FFF` indicates full bend upwards.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct PitchBend(pub u14);
impl PitchBend {
    /// The minimum value of `0x0000`, indicating full bend downwards.
    #[inline]
    pub const fn min_raw_value() -> PitchBend {
        PitchBend(u14::new(0x0000))
    }

    /// The middle value of `0x2000`, indicating no bend.
    #[inline]
    pub const fn mid_raw_value() -> PitchBend {
        PitchBend(u14::new(0x2000))
    }

    /// The maximum value of `0x3FFF`, indicating full bend upwards.
    #[inline]
    pub const fn max_raw_value() -> PitchBend {
        PitchBend(u14::new(0x3FFF))
    }

    /// Returns an int in the range `[-0x2000, 0x1FFF]`, with 0 indicating no bend.
    #[inline]
    pub fn as_int(self) -> i16 {
        self.0.as_int() as i16 - 0x2000
    }

    /// Returns an `f32` in the range `[-1.0, 1.0)`, with 0.0 indicating no bend.
    #[inline]
    pub fn as_f32(self) -> f32 {
        self.as_int() as f32 * (1.0 / 0x2000 as f32)
    }
}

/// A System Common message, as defined by the MIDI spec.
///
/// Apart from System Exclusive transfers, whose payload is captured in full, System Common
/// messages are reported as bare classification tags: the data bytes that trail some of them
/// (such as the song position) travel the stream as ordinary data bytes and are not collected.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum SystemCommon<'a> {
    /// A complete System Exclusive transfer.
    ///
    /// Exclusive messages start with a `0xF0` byte and finish with a `0xF7` byte; the payload
    /// slice includes neither, only data bytes in the `0x00..=0x7F` range.
    SysEx(&'a [u7]),
    /// A MIDI Time Code Quarter Frame message (`0xF1`).
    TimeCodeQuarterFrame,
    /// A Song Position Pointer message (`0xF2`).
    SongPosition,
    /// A Song Select message (`0xF3`).
    SongSelect,
    /// Request the device to tune itself (`0xF6`).
    TuneRequest,
    /// An End of Exclusive (`0xF7`) byte with no transfer in progress.
    SysExEnd,
    /// An undefined System Common status byte (`0xF4` or `0xF5`).
    Undefined(u8),
}
impl<'a> SystemCommon<'a> {
    /// Classify a System Common status byte in the range `0xF1..=0xF7`.
    ///
    /// `0xF0` is not classified here: it opens a System Exclusive transfer, which only becomes a
    /// [`SystemCommon::SysEx`] event once the closing `0xF7` arrives.
    #[inline]
    pub fn from_status(status: u8) -> SystemCommon<'static> {
        use self::SystemCommon::*;
        match status {
            0xF1 => TimeCodeQuarterFrame,
            0xF2 => SongPosition,
            0xF3 => SongSelect,
            0xF6 => TuneRequest,
            0xF7 => SysExEnd,
            _ => {
                //Unknown system common status (0xF4 and 0xF5 are reserved)
                Undefined(status)
            }
        }
    }

    /// Remove any lifetimed data from this event to create a `SystemCommon` with `'static`
    /// lifetime that can be stored and moved everywhere, solving borrow checker issues.
    ///
    /// WARNING: any System Exclusive payload will be replaced by an empty one.
    pub fn to_static(&self) -> SystemCommon<'static> {
        use self::SystemCommon::*;
        match *self {
            SysEx(_) => SysEx(&[]),
            TimeCodeQuarterFrame => TimeCodeQuarterFrame,
            SongPosition => SongPosition,
            SongSelect => SongSelect,
            TuneRequest => TuneRequest,
            SysExEnd => SysExEnd,
            Undefined(status) => Undefined(status),
        }
    }
}

/// A System Real-Time message.
///
/// These single-byte messages are time-sensitive, get top priority, and can appear at ANY point
/// of the stream, even in between the status and data bytes of another message, without
/// disturbing it.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum SystemRealtime {
    /// If sent, they should be sent 24 times per quarter note.
    TimingClock,
    /// Request the device to start playing at position 0.
    Start,
    /// Request the device to continue playing without resetting the position.
    Continue,
    /// Request the device to stop playing, but keep track of the position where it stopped.
    Stop,
    /// Once one of these messages is transmitted, a message should arrive every 300ms or else
    /// the connection is considered broken.
    ActiveSensing,
    /// Request the device to reset itself, usually to the same state as it was after turning on.
    Reset,
    /// An undefined System Real-Time status byte (`0xF9` or `0xFD`).
    Undefined(u8),
}
impl SystemRealtime {
    /// Classify a System Real-Time status byte in the range `0xF8..=0xFF`.
    #[inline]
    pub fn from_status(status: u8) -> SystemRealtime {
        use self::SystemRealtime::*;
        match status {
            0xF8 => TimingClock,
            0xFA => Start,
            0xFB => Continue,
            0xFC => Stop,
            0xFE => ActiveSensing,
            0xFF => Reset,
            _ => {
                //Unknown system realtime status (0xF9 and 0xFD are reserved)
                Undefined(status)
            }
        }
    }
}
