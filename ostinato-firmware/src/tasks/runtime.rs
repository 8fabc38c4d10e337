//! Runtime task
//!
//! Owns the scheduler and the output side of the panel. Waits for either
//! the next input event or the active program's next wake-up, whichever
//! comes first, so the exit gesture is seen while a program sleeps.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Instant, Timer};

use ostinato_core::config::SchedulerConfig;
use ostinato_core::scheduler::{RuntimeMode, Scheduler, TickOutcome};
use ostinato_core::time::remaining;
use ostinato_core::traits::Diagnostics;
use ostinato_programs::default_registry;

use crate::board::EuroPiPanel;
use crate::channels::{self, INPUT_CHANNEL};
use crate::diagnostics::DefmtDiagnostics;

fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

#[embassy_executor::task]
pub async fn runtime_task(mut panel: EuroPiPanel, config: SchedulerConfig) {
    info!("Runtime task started");

    let mut diag = DefmtDiagnostics;
    let registry = match default_registry() {
        Ok(registry) => registry,
        Err(e) => {
            diag.report(e.into());
            return;
        }
    };
    let mut scheduler = match Scheduler::new(registry, config) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            diag.report(e.into());
            return;
        }
    };
    if let Err(e) = scheduler.boot(&mut panel) {
        diag.report(e);
        return;
    }
    info!("{} programs registered, entering menu", scheduler.registry().len());

    let mut mode = scheduler.mode();

    loop {
        let now = now_ms();
        let input = match scheduler.next_wake(now) {
            Some(wake) => {
                let wait = Timer::after_millis(remaining(now, wake) as u64);
                match select(INPUT_CHANNEL.receive(), wait).await {
                    Either::First(event) => Some(event),
                    Either::Second(()) => None,
                }
            }
            None => Some(INPUT_CHANNEL.receive().await),
        };

        scheduler.report_overload(channels::take_dropped(), &mut diag);

        let now = now_ms();
        if let Some(event) = input {
            debug!("Input: {:?}", event);
            scheduler.handle_input(event, &mut panel, &mut diag);
        }

        let started = Instant::now();
        if scheduler.tick(now, &mut panel, &mut diag) == TickOutcome::Stopped {
            warn!("Program faulted, back to menu");
        }
        let took = started.elapsed().as_millis();
        if took > config.tick_budget_ms as u64 {
            warn!("Tick overran budget: {} ms > {} ms", took, config.tick_budget_ms);
        }

        let current = scheduler.mode();
        if current != mode {
            match current {
                RuntimeMode::Running { index, .. } => {
                    info!(
                        "Running program {}: {}",
                        index,
                        scheduler.active_label().unwrap_or("?")
                    );
                }
                RuntimeMode::Menu => info!("Menu (selected {})", scheduler.selection()),
            }
            mode = current;
        }
    }
}
