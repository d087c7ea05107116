//! Integration tests for the input logger.
//!
//! These tests drive `InputLogger` end-to-end through the public API against
//! `ScriptedConsole`: construction, start, the reader thread, the output
//! channel and stop, including stops that race an in-flight read.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use coninlog::application::input_logger::{InputLogger, LifecycleState, ReaderExit};
use coninlog::infrastructure::console_input::scripted::ScriptedConsole;
use coninlog_core::{ConsoleMode, InputEvent, KeyRecord, RawInputRecord};

const WAIT: Duration = Duration::from_secs(5);
const ORIGINAL: ConsoleMode = ConsoleMode(0x01F7);

fn key(vk: u16) -> KeyRecord {
    KeyRecord {
        key_down: 1,
        repeat_count: 1,
        virtual_key_code: vk,
        virtual_scan_code: 0,
        unicode_char: 0,
        control_key_state: 0,
    }
}

fn logger_with(buffer_size: usize) -> (Arc<ScriptedConsole>, InputLogger) {
    let console = Arc::new(ScriptedConsole::new(ORIGINAL));
    let logger = InputLogger::new(console.clone(), buffer_size).expect("logger must build");
    (console, logger)
}

#[test]
fn test_end_to_end_single_key_press() {
    // Arrange
    let (console, logger) = logger_with(10);
    let rx = logger.channel();
    assert_eq!(logger.state(), LifecycleState::Created);

    // Act
    logger.start().expect("start");
    console.push_key(KeyRecord {
        key_down: 1,
        repeat_count: 1,
        virtual_key_code: 0x41,
        virtual_scan_code: 0x1E,
        unicode_char: u16::from(b'A'),
        control_key_state: 0,
    });
    let event = rx.recv_timeout(WAIT).expect("event must arrive");
    logger.stop().expect("stop");

    // Assert
    assert_eq!(
        event,
        InputEvent {
            key_down: true,
            virtual_key_code: 0x41,
            virtual_scan_code: 0x1E,
            repeat_count: 1,
            character: u16::from(b'A'),
            control_key_state: 0,
        }
    );
    assert_eq!(rx.recv(), None, "channel reports closed after stop");
    assert_eq!(console.mode_writes(), vec![ConsoleMode::CAPTURE, ORIGINAL]);
}

#[test]
fn test_buffered_events_survive_stop() {
    // Arrange
    let (console, logger) = logger_with(10);
    let rx = logger.channel();
    logger.start().unwrap();

    for vk in 0x41..0x44 {
        console.push_key(key(vk));
    }
    // Wait until the reader has consumed all three records, then one more
    // read is in flight.
    while console.reads_served() < 3 {
        thread::sleep(Duration::from_millis(1));
    }
    thread::sleep(Duration::from_millis(20));

    // Act
    logger.stop().unwrap();

    // Assert
    let drained: Vec<u16> = rx.iter().map(|e| e.virtual_key_code).collect();
    assert_eq!(drained, vec![0x41, 0x42, 0x43]);
}

#[test]
fn test_events_arrive_in_console_order_without_loss() {
    // Arrange: a small buffer so the reader is regularly back-pressured.
    const N: u16 = 500;
    let (console, logger) = logger_with(4);
    let rx = logger.channel();
    logger.start().unwrap();

    // Act
    let feeder = {
        let console = Arc::clone(&console);
        thread::spawn(move || {
            for i in 0..N {
                if i % 7 == 0 {
                    console.push(RawInputRecord::Mouse);
                }
                console.push_key(key(i));
            }
        })
    };
    let received: Vec<u16> = (0..N)
        .map(|_| rx.recv_timeout(WAIT).expect("no event may be dropped").virtual_key_code)
        .collect();
    feeder.join().unwrap();
    logger.stop().unwrap();

    // Assert
    assert_eq!(received, (0..N).collect::<Vec<_>>());
    assert_eq!(rx.recv(), None, "no duplicates after the last event");
}

#[test]
fn test_zero_capacity_delivers_through_rendezvous() {
    let (console, logger) = logger_with(0);
    let rx = logger.channel();
    logger.start().unwrap();

    console.push_key(key(0x41));
    console.push_key(key(0x42));

    assert_eq!(rx.recv_timeout(WAIT).map(|e| e.virtual_key_code), Ok(0x41));
    assert_eq!(rx.recv_timeout(WAIT).map(|e| e.virtual_key_code), Ok(0x42));
    logger.stop().unwrap();
}

#[test]
fn test_multiple_consumers_share_one_stream() {
    // Arrange
    const N: u16 = 200;
    let (console, logger) = logger_with(8);
    logger.start().unwrap();
    let consumers: Vec<_> = (0..3)
        .map(|_| {
            let rx = logger.channel();
            thread::spawn(move || rx.iter().map(|e| e.virtual_key_code).collect::<Vec<_>>())
        })
        .collect();

    // Act
    for i in 0..N {
        console.push_key(key(i));
    }
    while console.reads_served() < usize::from(N) {
        thread::sleep(Duration::from_millis(1));
    }
    thread::sleep(Duration::from_millis(20));
    logger.stop().unwrap();

    // Assert: every event delivered exactly once, each consumer sees order.
    let mut seen = HashSet::new();
    for consumer in consumers {
        let got = consumer.join().unwrap();
        assert!(got.windows(2).all(|w| w[0] < w[1]), "per-consumer order: {got:?}");
        for vk in got {
            assert!(seen.insert(vk), "vk {vk} delivered twice");
        }
    }
    assert_eq!(seen.len(), usize::from(N));
}

#[test]
fn test_stop_during_blocked_read_never_panics() {
    // Repeats start/stop with the stop landing at different points relative
    // to the reader: parked in a read, between read and send, mid-stream.
    for round in 0..40u64 {
        // Arrange
        let (console, logger) = logger_with(8);
        let rx = logger.channel();
        logger.start().unwrap();

        let feeder = {
            let console = Arc::clone(&console);
            thread::spawn(move || {
                for vk in 0..5 {
                    console.push_key(key(vk));
                    thread::sleep(Duration::from_micros(round * 37 % 400));
                }
            })
        };
        thread::sleep(Duration::from_micros(round * 53 % 900));

        // Act
        logger.stop().expect("stop must succeed");
        feeder.join().unwrap();
        // Wake the reader in case it is still parked.
        console.push(RawInputRecord::Focus);

        // Assert
        let drained: Vec<u16> = rx.iter().map(|e| e.virtual_key_code).collect();
        let expected_prefix: Vec<u16> = (0..5).take(drained.len()).collect();
        assert_eq!(drained, expected_prefix, "round {round}: events must be an in-order prefix");
        assert_eq!(logger.wait_for_reader(WAIT).unwrap(), Some(ReaderExit::Stopped));
        assert_eq!(console.current_mode(), ORIGINAL);
    }
}

#[test]
fn test_stop_releases_reader_when_nobody_drains() {
    // Arrange: buffer of one, no consumer ever receives.
    let (console, logger) = logger_with(1);
    logger.start().unwrap();
    console.push_key(key(0x41));
    console.push_key(key(0x42));
    while console.reads_served() < 2 {
        thread::sleep(Duration::from_millis(1));
    }

    // Act
    logger.stop().unwrap();
    console.push_key(key(0x43));

    // Assert: the queued event drains, the blocked one is dropped.
    assert_eq!(logger.wait_for_reader(WAIT).unwrap(), Some(ReaderExit::Stopped));
    assert_eq!(console.reads_served(), 2);
    let drained: Vec<u16> = logger.channel().iter().map(|e| e.virtual_key_code).collect();
    assert_eq!(drained, vec![0x41]);
}
