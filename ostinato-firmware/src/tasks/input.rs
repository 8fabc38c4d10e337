//! Input sampling task
//!
//! Polls the buttons and knobs at the configured period, runs the samples
//! through the input layer and forwards the resulting events to the
//! runtime task.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use ostinato_core::config::InputConfig;
use ostinato_core::input::InputLayer;

use crate::board::PanelInputs;
use crate::channels::{self, INPUT_CHANNEL};

#[embassy_executor::task]
pub async fn input_task(mut inputs: PanelInputs, config: InputConfig) {
    info!("Input task started ({} ms poll)", config.poll_period_ms);

    let mut layer = InputLayer::new(config);
    let mut ticker = Ticker::every(Duration::from_millis(config.poll_period_ms as u64));

    loop {
        ticker.next().await;

        let raw = inputs.sample().await;
        channels::publish_knobs([raw.knob_1, raw.knob_2]);
        layer.sample(raw, Instant::now().as_millis() as u32);

        while let Some(event) = layer.next_event() {
            trace!("Input event: {:?}", event);
            if INPUT_CHANNEL.try_send(event).is_err() {
                channels::record_dropped(1);
            }
        }
        channels::record_dropped(layer.take_dropped());
    }
}
