//! Keypad Vault host game
//!
//! Plays the game on a simulated board. Every argument is one typed entry in
//! hex digits; end an entry with `f` to submit it.
//!
//! Run with: cargo run --example host_game --features emulator -- 1234f 9999f 1234f
//! Set `RUST_LOG=firmware=debug` to watch every interrupt.

use firmware::sim::{self, Simulator};
use firmware::{setup, GameConfig, GameState, Stalled};
use platform::config;
use platform::mocks::DisplayEvent;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("{} v{} - host game\n", config::APP_NAME, config::APP_VERSION);

    let vault = sim::vault();
    let (mut game, handlers) = setup(&vault, GameConfig::default())?;
    let mut simulator = Simulator::new(handlers);

    let mut typed = 0usize;
    for entry in std::env::args().skip(1) {
        typed = typed.saturating_add(simulator.type_str(&entry));
    }
    if typed == 0 {
        println!("No keys given. Example: host_game 1234f 9999f 1234f");
        return Ok(());
    }
    tracing::info!(keys = typed, "script loaded");

    loop {
        let before = game.state();
        match game.step(&mut simulator) {
            Ok(after) => {
                println!("{before:?} -> {after:?}");
                match after {
                    GameState::Guess if before == GameState::ShowPassword => {
                        println!("  password: {:x?}", game.password());
                    }
                    GameState::GameOver => println!("  guess:    {:x?}", game.guess()),
                    _ => {}
                }
                if before == GameState::GameOver {
                    let shown = critical_section::with(|cs| {
                        vault.peripherals(cs).borrow().display.current()
                    });
                    if let Some(DisplayEvent::Glyph(glyph)) = shown {
                        println!("  display:  {glyph:?}");
                    }
                }
            }
            Err(Stalled) => {
                println!("\nScript exhausted in {before:?}.");
                break;
            }
        }
    }

    println!(
        "{} key events, {} timer ticks, digits shown: {:x?}",
        simulator.key_events(),
        simulator.ticks(),
        simulator.display_digits().as_slice()
    );
    Ok(())
}
