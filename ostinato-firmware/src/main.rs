//! Ostinato - Eurorack Control Program Firmware
//!
//! Main firmware binary for RP2040-based EuroPi-style modules. Hosts the
//! bundled control programs on the ostinato-core runtime: pick a program
//! in the menu with the buttons or knob 1, hold both buttons to return.

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embedded_alloc::LlffHeap as Heap;
use {defmt_rtt as _, panic_probe as _};

use ostinato_core::config::{parse_config, RuntimeConfig};

mod board;
mod channels;
mod diagnostics;
mod tasks;

// Heap for program instances
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 16KB
const HEAP_SIZE: usize = 16 * 1024;

/// Embedded runtime tuning (compiled into firmware)
/// Edit module.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../module.toml");

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Ostinato firmware starting...");

    init_heap();

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    let (inputs, panel) = board::init(p);

    spawner.spawn(tasks::input_task(inputs, config.input)).unwrap();
    spawner
        .spawn(tasks::runtime_task(panel, config.scheduler))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}

/// Parse the embedded configuration
///
/// build.rs rejects a bad module.toml, so the fallback only matters while
/// the two parsers drift during development.
fn load_config() -> RuntimeConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration: {:?}", config);
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            RuntimeConfig::default()
        }
    }
}
