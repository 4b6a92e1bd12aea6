//! Keypad Vault Firmware - Main Entry Point
//!
//! Hardware-only entry point for the S3C44B0X board. `_start` (see
//! `hardware::vectors`) sets up the stacks, zeroes `.bss` and calls `Main`.

#![no_std]
#![no_main]

use firmware::hardware::{self, logger, vectors, S3c44b0x};
use firmware::{setup, GameConfig, SpinWait, Vault};
use static_cell::StaticCell;

static VAULT: StaticCell<Vault<S3c44b0x>> = StaticCell::new();

#[no_mangle]
#[allow(non_snake_case)] // symbol the startup code branches to
extern "C" fn Main() -> ! {
    // Step 1: UART0 carries the defmt frames; nothing may log before this.
    logger::init();
    defmt::info!(
        "{=str} firmware v{=str}",
        platform::config::APP_NAME,
        platform::config::APP_VERSION
    );

    // Step 2: bind the register blocks and move them into the vault the
    // handlers share with the foreground.
    // SAFETY: the only call; nothing else maps these register blocks.
    let peripherals = unsafe { S3c44b0x::peripherals() };
    let vault: &'static Vault<S3c44b0x> = VAULT.init(Vault::new(peripherals));

    // Step 3: wire pin, timer and interrupt controller.
    let (mut game, handlers) = match setup(vault, GameConfig::default()) {
        Ok(pair) => pair,
        Err(e) => {
            defmt::error!("setup failed: {}", e);
            hardware::park();
        }
    };

    // Step 4: point the key and timer lines at their trampolines. The
    // keyboard line stays masked until the first capture phase.
    vectors::install(handlers);

    // Step 5: run the game forever.
    loop {
        if let Err(e) = game.step(&mut SpinWait) {
            defmt::warn!("step stalled: {}", e);
        }
    }
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    defmt::error!("panic: {}", defmt::Display2Format(info));
    hardware::park()
}
