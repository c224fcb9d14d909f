use crate::{
    num::{u14, u4, u7},
    stack_buffer, Buffer, ChannelVoice, DefaultBuffer, ErrorKind, Event, Parser, PitchBend,
    SystemCommon, SystemRealtime,
};
use proptest::prelude::*;

/// Feed `bytes` one at a time to a fresh parser and compare the decode of every single byte.
fn check(bytes: &[u8], expected: &[Option<Event>]) {
    assert_eq!(bytes.len(), expected.len());
    let mut parser = Parser::new();
    for (i, (&byte, expect)) in bytes.iter().zip(expected).enumerate() {
        let got = parser.feed(byte);
        assert_eq!(got, *expect, "wrong decode for byte {} (0x{:02X})", i, byte);
    }
}

fn note_on(channel: u8, key: u8, vel: u8) -> Option<Event<'static>> {
    Some(Event::Channel {
        channel: u4::new(channel),
        msg: ChannelVoice::NoteOn {
            key: u7::new(key),
            vel: u7::new(vel),
        },
    })
}

fn note_off(channel: u8, key: u8, vel: u8) -> Option<Event<'static>> {
    Some(Event::Channel {
        channel: u4::new(channel),
        msg: ChannelVoice::NoteOff {
            key: u7::new(key),
            vel: u7::new(vel),
        },
    })
}

#[test]
fn realtime_passthrough() {
    use crate::SystemRealtime::*;
    let table = [
        (0xF8, TimingClock),
        (0xF9, Undefined(0xF9)),
        (0xFA, Start),
        (0xFB, Continue),
        (0xFC, Stop),
        (0xFD, Undefined(0xFD)),
        (0xFE, ActiveSensing),
        (0xFF, Reset),
    ];
    let mut parser = Parser::new();
    for &(byte, expected) in table.iter() {
        assert_eq!(parser.feed(byte), Some(Event::Realtime(expected)));
    }
}

#[test]
fn realtime_does_not_disturb_assembly() {
    check(
        &[0x90, 0x40, 0xF8, 0x7F],
        &[
            None,
            None,
            Some(Event::Realtime(SystemRealtime::TimingClock)),
            note_on(0, 0x40, 0x7F),
        ],
    );
}

#[test]
fn realtime_mid_sysex() {
    const PAYLOAD: &[u7] = &[u7::new(0x01), u7::new(0x02)];
    check(
        &[0xF0, 0x01, 0xFA, 0x02, 0xF7],
        &[
            None,
            None,
            Some(Event::Realtime(SystemRealtime::Start)),
            None,
            Some(Event::Common(SystemCommon::SysEx(PAYLOAD))),
        ],
    );
}

#[test]
fn note_on_velocity_zero_is_note_off() {
    check(&[0x90, 0x40, 0x00], &[None, None, note_off(0, 0x40, 0)]);
}

#[test]
fn running_status_reuse() {
    check(
        &[0x90, 0x40, 0x7F, 0x41, 0x7F],
        &[None, None, note_on(0, 0x40, 0x7F), None, note_on(0, 0x41, 0x7F)],
    );
    //Single-data-byte messages complete on every byte under running status
    check(
        &[0xC5, 0x0A, 0x0B],
        &[
            None,
            Some(Event::Channel {
                channel: u4::new(5),
                msg: ChannelVoice::ProgramChange {
                    program: u7::new(0x0A),
                },
            }),
            Some(Event::Channel {
                channel: u4::new(5),
                msg: ChannelVoice::ProgramChange {
                    program: u7::new(0x0B),
                },
            }),
        ],
    );
}

#[test]
fn running_status_survives_velocity_zero() {
    //The raw status is what runs on, not the normalized message kind
    check(
        &[0x90, 0x40, 0x00, 0x41, 0x10],
        &[None, None, note_off(0, 0x40, 0), None, note_on(0, 0x41, 0x10)],
    );
}

#[test]
fn running_status_survives_system_common() {
    check(
        &[0x90, 0x40, 0x7F, 0xF6, 0x41, 0x10],
        &[
            None,
            None,
            note_on(0, 0x40, 0x7F),
            Some(Event::Common(SystemCommon::TuneRequest)),
            None,
            note_on(0, 0x41, 0x10),
        ],
    );
}

#[test]
fn sysex_payload() {
    const PAYLOAD: &[u7] = &[u7::new(0x01), u7::new(0x02)];
    check(
        &[0xF0, 0x01, 0x02, 0xF7],
        &[None, None, None, Some(Event::Common(SystemCommon::SysEx(PAYLOAD)))],
    );
    //An empty transfer is still a transfer
    check(
        &[0xF0, 0xF7],
        &[None, Some(Event::Common(SystemCommon::SysEx(&[])))],
    );
}

#[test]
fn sysex_overflow_is_dropped() {
    stack_buffer! {
        struct TinyBuf([u8; 4]);
    }
    let mut parser = Parser::with_buffer(TinyBuf::new());
    assert_eq!(parser.feed(0xF0), None);
    for byte in 0x01..=0x04 {
        assert_eq!(parser.feed(byte), None);
    }
    //The fifth payload byte exceeds the 4-byte buffer and kills the whole transfer
    assert_eq!(parser.feed(0x05), None);
    //The closing byte cannot resurrect it: with no transfer in progress it decodes as a
    //stray end-of-exclusive tag
    assert_eq!(
        parser.feed(0xF7),
        Some(Event::Common(SystemCommon::SysExEnd))
    );
    //The parser is healthy afterwards
    assert_eq!(parser.feed(0x90), None);
    assert_eq!(parser.feed(0x40), None);
    assert_eq!(parser.feed(0x7F), note_on(0, 0x40, 0x7F));
}

#[test]
fn status_byte_aborts_partial_message() {
    check(
        &[0x90, 0x40, 0x80, 0x30, 0x00],
        &[None, None, None, None, note_off(0, 0x30, 0)],
    );
}

#[test]
fn status_byte_aborts_sysex() {
    //A status byte other than EOX interrupts the transfer: the partial payload is dropped and
    //the byte starts its own message
    check(
        &[0xF0, 0x01, 0x02, 0x90, 0x40, 0x7F, 0xF7],
        &[
            None,
            None,
            None,
            None,
            None,
            note_on(0, 0x40, 0x7F),
            Some(Event::Common(SystemCommon::SysExEnd)),
        ],
    );
}

#[test]
fn sysex_restart_on_f0() {
    const PAYLOAD: &[u7] = &[u7::new(0x02)];
    check(
        &[0xF0, 0x01, 0xF0, 0x02, 0xF7],
        &[
            None,
            None,
            None,
            None,
            Some(Event::Common(SystemCommon::SysEx(PAYLOAD))),
        ],
    );
}

#[test]
fn orphan_data_bytes_are_dropped() {
    check(&[0x40, 0x41], &[None, None]);
}

#[test]
fn reset_clears_running_status_and_partial() {
    let mut parser = Parser::new();
    assert_eq!(parser.feed(0x90), None);
    assert_eq!(parser.feed(0x40), None);
    parser.reset();
    //Both the pending data byte and the running status are gone
    assert_eq!(parser.feed(0x7F), None);

    assert_eq!(parser.feed(0xF0), None);
    assert_eq!(parser.feed(0x01), None);
    parser.reset();
    //No transfer in progress anymore, so the closing byte decodes as a stray tag
    assert_eq!(
        parser.feed(0xF7),
        Some(Event::Common(SystemCommon::SysExEnd))
    );
}

#[test]
fn system_common_tags() {
    use crate::SystemCommon::*;
    check(
        &[0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6],
        &[
            Some(Event::Common(TimeCodeQuarterFrame)),
            Some(Event::Common(SongPosition)),
            Some(Event::Common(SongSelect)),
            Some(Event::Common(Undefined(0xF4))),
            Some(Event::Common(Undefined(0xF5))),
            Some(Event::Common(TuneRequest)),
        ],
    );
    //The data bytes that trail some of these messages are not collected, and with no running
    //status they mean nothing
    check(
        &[0xF2, 0x01, 0x02],
        &[Some(Event::Common(SongPosition)), None, None],
    );
}

#[test]
fn pitch_bend_assembly() {
    let mut parser = Parser::new();
    assert_eq!(parser.feed(0xE3), None);
    //Least significant 7 bits first
    assert_eq!(parser.feed(0x00), None);
    match parser.feed(0x40) {
        Some(Event::Channel {
            channel,
            msg: ChannelVoice::PitchBend { bend },
        }) => {
            assert_eq!(channel, 3);
            assert_eq!(bend, PitchBend::mid_raw_value());
            assert_eq!(bend.as_int(), 0);
            assert_eq!(bend.as_f32(), 0.0);
        }
        other => panic!("expected a pitch bend, got {:?}", other),
    }
    assert_eq!(PitchBend::min_raw_value().as_int(), -0x2000);
    assert_eq!(PitchBend::max_raw_value().as_int(), 0x1FFF);
    assert_eq!(PitchBend::max_raw_value().0, u14::new(0x3FFF));
}

#[test]
fn remaining_voice_messages() {
    check(
        &[0xD2, 0x33],
        &[
            None,
            Some(Event::Channel {
                channel: u4::new(2),
                msg: ChannelVoice::ChannelPressure {
                    pressure: u7::new(0x33),
                },
            }),
        ],
    );
    check(
        &[0xA1, 0x10, 0x20],
        &[
            None,
            None,
            Some(Event::Channel {
                channel: u4::new(1),
                msg: ChannelVoice::PolyPressure {
                    key: u7::new(0x10),
                    pressure: u7::new(0x20),
                },
            }),
        ],
    );
    check(
        &[0xB4, 0x07, 0x64],
        &[
            None,
            None,
            Some(Event::Channel {
                channel: u4::new(4),
                msg: ChannelVoice::ControlChange {
                    controller: u7::new(0x07),
                    value: u7::new(0x64),
                },
            }),
        ],
    );
}

#[test]
fn feed_slice_matches_feed() {
    let stream = [0x90, 0x40, 0x7F, 0xF0, 0x01, 0x02, 0xF7, 0xC2, 0x05];

    let mut whole = Vec::new();
    let mut parser = Parser::new();
    parser.feed_slice(&stream, |ev| whole.push(format!("{:?}", ev)));

    let mut split = Vec::new();
    let mut parser = Parser::new();
    for chunk in stream.chunks(2) {
        parser.feed_slice(chunk, |ev| split.push(format!("{:?}", ev)));
    }

    assert_eq!(whole, split);
    assert_eq!(whole.len(), 3);
}

#[test]
fn parse_packets() {
    assert_eq!(
        Event::parse(&[0x91, 0x3C, 0x40]).unwrap(),
        Event::Channel {
            channel: u4::new(1),
            msg: ChannelVoice::NoteOn {
                key: u7::new(0x3C),
                vel: u7::new(0x40),
            },
        },
    );
    //Zero velocity carries NoteOff meaning in packet form as well
    assert_eq!(
        Event::parse(&[0x91, 0x3C, 0x00]).unwrap(),
        Event::Channel {
            channel: u4::new(1),
            msg: ChannelVoice::NoteOff {
                key: u7::new(0x3C),
                vel: u7::new(0),
            },
        },
    );
    //Bytes beyond the message length are ignored
    assert_eq!(
        Event::parse(&[0xC5, 0x0A, 0x0B]).unwrap(),
        Event::Channel {
            channel: u4::new(5),
            msg: ChannelVoice::ProgramChange {
                program: u7::new(0x0A),
            },
        },
    );
    //The closing EOX byte is optional in packet form
    const PAYLOAD: &[u7] = &[u7::new(0x01), u7::new(0x02)];
    assert_eq!(
        Event::parse(&[0xF0, 0x01, 0x02, 0xF7]).unwrap(),
        Event::Common(SystemCommon::SysEx(PAYLOAD)),
    );
    assert_eq!(
        Event::parse(&[0xF0, 0x01, 0x02]).unwrap(),
        Event::Common(SystemCommon::SysEx(PAYLOAD)),
    );
    assert_eq!(
        Event::parse(&[0xF8]).unwrap(),
        Event::Realtime(SystemRealtime::TimingClock),
    );
    assert_eq!(
        Event::parse(&[0xF6]).unwrap(),
        Event::Common(SystemCommon::TuneRequest),
    );
}

#[test]
fn parse_rejects_invalid_packets() {
    let err = Event::parse(&[]).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Invalid(_)));
    assert!(err.to_string().starts_with("invalid midi:"));
    assert!(Event::parse(&[0x40]).is_err());
    assert!(Event::parse(&[0x90, 0x40]).is_err());
}

#[test]
fn out_of_range_data_bytes() {
    let result = Event::parse(&[0x90, 0xC0, 0x40]);
    if cfg!(feature = "strict") {
        assert!(matches!(result.unwrap_err().kind(), ErrorKind::Malformed(_)));
    } else {
        //Without the strict feature the top bit is masked away
        assert_eq!(
            result.unwrap(),
            Event::Channel {
                channel: u4::new(0),
                msg: ChannelVoice::NoteOn {
                    key: u7::new(0x40),
                    vel: u7::new(0x40),
                },
            },
        );
    }
}

#[test]
fn event_accessors() {
    let ev = Event::parse(&[0x81, 0x3C, 0x20]).unwrap();
    assert_eq!(
        ev.as_channel(),
        Some((
            u4::new(1),
            ChannelVoice::NoteOff {
                key: u7::new(0x3C),
                vel: u7::new(0x20),
            },
        )),
    );
    assert_eq!(Event::parse(&[0xF8]).unwrap().as_channel(), None);
    assert_eq!(ev.to_static(), ev);

    //Detaching a sysex event drops the payload
    const PAYLOAD: &[u7] = &[u7::new(0x55)];
    let sysex = Event::Common(SystemCommon::SysEx(PAYLOAD));
    assert_eq!(sysex.to_static(), Event::Common(SystemCommon::SysEx(&[])));
}

#[test]
fn restricted_ints() {
    assert_eq!(u7::new(0xFF).as_int(), 0x7F);
    assert_eq!(u7::try_from(0x80), None);
    assert_eq!(u7::try_from(0x7F), Some(u7::max_value()));
    assert_eq!(u4::from(0x9C), u4::new(0x0C));
    assert_eq!(u14::new(0x2000).as_int(), 0x2000);
    assert_eq!(format!("{}", u7::new(5)), "5");
    assert_eq!(u7::slice_from_int(&[0x01, 0x02, 0x85, 0x03]).len(), 2);
    assert_eq!(u7::slice_try_from_int(&[0x01, 0x85]), None);
    let data = [u7::new(1), u7::new(2)];
    assert_eq!(u7::slice_as_int(&data), &[1, 2]);
}

#[test]
fn default_buf() {
    let mut buf = DefaultBuffer::default();
    buf.push(123).unwrap();
    buf.push(143).unwrap();
    buf.push(15).unwrap();
    assert_eq!(buf.as_slice(), &[123, 143, 15]);
    buf.clear();
    buf.push(14).unwrap();
    assert_eq!(buf.as_slice(), &[14]);
    while buf.as_slice().len() < DefaultBuffer::MAX_CAP {
        buf.push(0).unwrap();
    }
    let buf_copy = buf.clone();
    //A failed push leaves the buffer untouched
    assert_eq!(buf.push(1), Err(()));
    assert_eq!(buf.as_slice(), buf_copy.as_slice());
    assert_eq!(format!("{:?}", buf), format!("{:?}", buf_copy));
}

#[test]
fn stack_buf() {
    stack_buffer! {
        struct Buf([u8; 16]);
    }
    let mut buf = Buf::new();
    for byte in 0..16u8 {
        buf.push(byte).unwrap();
    }
    assert_eq!(buf.as_slice().len(), Buf::MAX_CAP);
    assert_eq!(buf.push(16), Err(()));
    buf.clear();
    assert!(buf.as_slice().is_empty());
    buf.push(99).unwrap();
    assert_eq!(buf.as_slice(), &[99]);
}

#[cfg(feature = "alloc")]
#[test]
fn vec_buf() {
    let mut parser = Parser::with_buffer(Vec::<u8>::new());
    assert_eq!(parser.feed(0xF0), None);
    for byte in 0..=0x7F {
        assert_eq!(parser.feed(byte), None);
    }
    //A Vec buffer never overflows, so oversized transfers survive
    match parser.feed(0xF7) {
        Some(Event::Common(SystemCommon::SysEx(payload))) => {
            assert_eq!(payload.len(), 0x80);
            assert_eq!(u7::slice_as_int(payload)[0x33], 0x33);
        }
        other => panic!("expected a sysex event, got {:?}", other),
    }
}

/// Decode a stream and render every event to a string, optionally dropping realtime events.
fn events_of(bytes: &[u8], keep_realtime: bool) -> Vec<String> {
    let mut parser = Parser::new();
    let mut out = Vec::new();
    for &byte in bytes {
        if let Some(ev) = parser.feed(byte) {
            if keep_realtime || !matches!(ev, Event::Realtime(_)) {
                out.push(format!("{:?}", ev));
            }
        }
    }
    out
}

proptest! {
    #[test]
    fn arbitrary_streams_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let mut parser = Parser::new();
        let mut count = 0;
        for &byte in bytes.iter() {
            if parser.feed(byte).is_some() {
                count += 1;
            }
        }
        prop_assert!(count <= bytes.len());
    }

    #[test]
    fn realtime_bytes_are_transparent(
        bytes in proptest::collection::vec(0x00u8..0xF8, 0..256),
        splice in any::<proptest::sample::Index>(),
        realtime in 0xF8u8..=0xFF,
    ) {
        let mut spliced = bytes.clone();
        spliced.insert(splice.index(bytes.len() + 1), realtime);
        prop_assert_eq!(events_of(&bytes, false), events_of(&spliced, false));
    }

    #[test]
    fn emitted_payloads_fit_the_buffer(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let mut parser = Parser::new();
        parser.feed_slice(&bytes, |ev| {
            if let Event::Common(SystemCommon::SysEx(payload)) = ev {
                assert!(payload.len() <= DefaultBuffer::MAX_CAP);
            }
        });
    }

    #[test]
    fn parse_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let _ = Event::parse(&bytes);
    }
}
