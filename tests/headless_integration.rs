use std::sync::mpsc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use decalc::calc::{Calculator, Effect, Phase};
use decalc::clock::ManualClock;
use decalc::display::RecordingSurface;
use decalc::keypad::{parse_sequence, Input};
use decalc::runtime::{CalcEvent, FixedTicker, RefreshTimer, Runner, TestEventSource};
use decalc::time_code::time_code;

// Headless integration using the internal runtime + Calculator without a TTY.
// The refresh timer feeds the same channel the runner reads, exactly like the binary.

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 7)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

type HeadlessCalc = Calculator<ManualClock, RecordingSurface>;

fn press(calc: &mut HeadlessCalc, keys: &str) -> Vec<Effect> {
    parse_sequence(keys)
        .unwrap()
        .into_iter()
        .map(|k| calc.handle(Input::Key(k)))
        .collect()
}

#[test]
fn headless_plain_arithmetic() {
    let clock = ManualClock::new(at(9, 0, 0));
    let mut calc = Calculator::new(clock, RecordingSurface::default());

    press(&mut calc, "1 2 + 7 =");
    assert_eq!(calc.display(), "19");

    press(&mut calc, "AC 5 ÷ 0 =");
    assert_eq!(calc.display(), "Error");
    assert_eq!(calc.phase(), Phase::Normal);
}

#[test]
fn headless_decoy_tracks_clock_and_reveal_stops_it() {
    let clock = ManualClock::new(at(14, 45, 10));
    let mut calc = Calculator::new(clock.clone(), RecordingSurface::default());

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(200)),
    );

    // Arm the decoy with 10 + 20 + 5
    press(&mut calc, ". . 1 0 + 2 0 + 5 +");
    assert_eq!(calc.phase(), Phase::Locked);
    assert_eq!(calc.display(), "35");

    // Any key starts it
    let effects = press(&mut calc, "4");
    assert_eq!(effects, vec![Effect::StartRefresh]);
    assert_eq!(calc.display(), (time_code(at(14, 45, 10)) - 35).to_string());

    let mut timer = RefreshTimer::start(FixedTicker::new(Duration::from_millis(5)), tx.clone());

    // Move the clock and let refresh events catch the display up without input
    clock.set(at(14, 50, 0));
    let expected = (time_code(at(14, 50, 0)) - 35).to_string();
    for _ in 0..200u32 {
        if let CalcEvent::Refresh = runner.step() {
            calc.on_tick();
        }
        if calc.display() == expected {
            break;
        }
    }
    assert_eq!(calc.display(), expected);

    // Reveal
    let effects = press(&mut calc, "=");
    assert_eq!(effects, vec![Effect::StopRefresh]);
    timer.stop();
    assert_eq!(calc.display(), time_code(at(14, 50, 0)).to_string());

    // Stale refresh events and later clock moves leave the display alone
    tx.send(CalcEvent::Refresh).unwrap();
    clock.set(at(15, 10, 0));
    for _ in 0..5u32 {
        if let CalcEvent::Refresh = runner.step() {
            assert!(!calc.on_tick());
        }
    }
    assert_eq!(calc.display(), time_code(at(14, 50, 0)).to_string());
    assert!(calc.session_state.is_locked);
}

#[test]
fn headless_background_tap_starts_decoy() {
    let clock = ManualClock::new(at(8, 5, 45));
    let mut calc = Calculator::new(clock, RecordingSurface::default());

    press(&mut calc, ". . 1 + 1 + 1 +");
    assert_eq!(calc.handle(Input::BackgroundTap), Effect::StartRefresh);
    assert_eq!(calc.phase(), Phase::LockedRevealing);
    // 08:05:45 rounds to 08:06
    assert_eq!(calc.display(), (3_070_806 - 3).to_string());
    assert_eq!(calc.surface().last(), Some(calc.display()));
}
