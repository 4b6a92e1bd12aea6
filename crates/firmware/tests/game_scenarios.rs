//! Game scenarios: whole rounds of the state machine on a simulated board.
//!
//! Each test wires a fresh simulated board through `firmware::setup`, feeds
//! scripted key presses through the interrupt simulator and steps the game
//! the way the firmware main loop does.
//!
//! Run with: cargo test -p firmware --test game_scenarios

#![allow(clippy::unwrap_used, clippy::panic)]

use embedded_hal_mock::eh1::delay::NoopDelay;
use firmware::sim::{self, SimBoard, Simulator};
use firmware::{setup, Game, GameConfig, GameState, Stalled, Vault, WaitHook};
use platform::mocks::DisplayEvent;
use platform::Glyph;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type TestVault = Vault<SimBoard<NoopDelay>>;

fn noop_vault() -> TestVault {
    Vault::new(sim::peripherals(NoopDelay::new()))
}

fn current(vault: &TestVault) -> Option<DisplayEvent> {
    critical_section::with(|cs| vault.peripherals(cs).borrow().display.current())
}

/// Step until the game reaches `state`, failing after `limit` steps.
fn run_until(
    game: &mut Game<'_, SimBoard<NoopDelay>>,
    hook: &mut impl WaitHook,
    state: GameState,
    limit: usize,
) -> Result<(), Stalled> {
    for _ in 0..limit {
        if game.step(hook)? == state {
            return Ok(());
        }
    }
    panic!("{state:?} not reached within {limit} steps");
}

// ---------------------------------------------------------------------------
// Test: password entry and playback
// ---------------------------------------------------------------------------

/// Typing 1 2 3 4 F stores 1234 as the password and plays it back in order.
#[test]
fn test_password_is_captured_and_played_back() {
    let vault = noop_vault();
    let (mut game, handlers) = setup(&vault, GameConfig::default()).unwrap();
    let mut sim = Simulator::new(handlers);
    sim.type_str("1234F");

    assert_eq!(game.step(&mut sim), Ok(GameState::ShowPassword));
    assert_eq!(sim.key_events(), 5);
    assert_eq!(game.step(&mut sim), Ok(GameState::Guess));

    assert_eq!(game.password(), [1, 2, 3, 4]);
    assert_eq!(sim.display_digits().as_slice(), &[1, 2, 3, 4]);
    // Four digits plus the tick that ends playback.
    assert_eq!(sim.ticks(), 5);
}

// ---------------------------------------------------------------------------
// Test: guesses
// ---------------------------------------------------------------------------

/// A matching guess ends the round and shows the match glyph.
#[test]
fn test_matching_guess_returns_to_init() {
    let vault = noop_vault();
    let (mut game, handlers) = setup(&vault, GameConfig::default()).unwrap();
    let mut sim = Simulator::new(handlers);
    sim.type_str("1234F");
    run_until(&mut game, &mut sim, GameState::Guess, 2).unwrap();

    sim.type_str("1234F");
    assert_eq!(game.step(&mut sim), Ok(GameState::ShowGuess));
    assert_eq!(game.step(&mut sim), Ok(GameState::GameOver));
    assert_eq!(game.guess(), [1, 2, 3, 4]);
    assert_eq!(game.step(&mut sim), Ok(GameState::Init));
    assert_eq!(current(&vault), Some(DisplayEvent::Glyph(Glyph::Match)));
}

/// A wrong guess goes back to guessing and shows the mismatch glyph.
#[test]
fn test_wrong_guess_asks_again() {
    let vault = noop_vault();
    let (mut game, handlers) = setup(&vault, GameConfig::default()).unwrap();
    let mut sim = Simulator::new(handlers);
    sim.type_str("1234F");
    run_until(&mut game, &mut sim, GameState::Guess, 2).unwrap();

    sim.type_str("9999F");
    run_until(&mut game, &mut sim, GameState::Guess, 3).unwrap();
    assert_eq!(game.guess(), [9, 9, 9, 9]);
    assert_eq!(game.password(), [1, 2, 3, 4]);
    assert_eq!(current(&vault), Some(DisplayEvent::Glyph(Glyph::Mismatch)));
}

/// A wrong guess followed by the right one wins on the second try.
#[test]
fn test_second_guess_can_win() {
    let vault = noop_vault();
    let (mut game, handlers) = setup(&vault, GameConfig::default()).unwrap();
    let mut sim = Simulator::new(handlers);
    sim.type_str("ABCDF");
    sim.type_str("0000F");
    sim.type_str("abcdF");

    run_until(&mut game, &mut sim, GameState::Init, 10).unwrap();
    assert_eq!(game.password(), [0xA, 0xB, 0xC, 0xD]);
    assert_eq!(game.guess(), [0xA, 0xB, 0xC, 0xD]);
    assert_eq!(sim.pending_keys(), 0);
    assert_eq!(current(&vault), Some(DisplayEvent::Glyph(Glyph::Match)));
}

// ---------------------------------------------------------------------------
// Test: input edge cases
// ---------------------------------------------------------------------------

/// Only the most recent four keys before the terminator count.
#[test]
fn test_long_entry_keeps_last_four_keys() {
    let vault = noop_vault();
    let (mut game, handlers) = setup(&vault, GameConfig::default()).unwrap();
    let mut sim = Simulator::new(handlers);
    sim.type_str("123456F");

    run_until(&mut game, &mut sim, GameState::Guess, 2).unwrap();
    assert_eq!(game.password(), [3, 4, 5, 6]);
}

/// A terminator after too few keys starts the capture over.
#[test]
fn test_short_entry_is_discarded() {
    let vault = noop_vault();
    let (mut game, handlers) = setup(&vault, GameConfig::default()).unwrap();
    let mut sim = Simulator::new(handlers);
    sim.type_str("12F");
    sim.type_str("5678F");

    assert_eq!(game.step(&mut sim), Ok(GameState::ShowPassword));
    assert_eq!(game.step(&mut sim), Ok(GameState::Guess));
    assert_eq!(game.password(), [5, 6, 7, 8]);
}

/// Running out of scripted keys mid-capture stalls instead of spinning.
#[test]
fn test_capture_without_terminator_stalls() {
    let vault = noop_vault();
    let (mut game, handlers) = setup(&vault, GameConfig::default()).unwrap();
    let mut sim = Simulator::new(handlers);
    sim.type_str("123");

    assert_eq!(game.step(&mut sim), Err(Stalled));
    assert_eq!(game.state(), GameState::Init);
}
