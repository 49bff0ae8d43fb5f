use std::error::Error;
use std::sync::Arc;

use log::{error, info};

use dashbutton::{
    ActionDispatcher, CaptureLoop, DeviceTable, LogFacade, LogSink, Settings, StartupError, ThreadSpawner,
    build_filter, open_capture,
};

fn main() -> Result<(), Box<dyn Error>> {
    let settings = Settings::new().map_err(StartupError::from)?;

    env_logger::Builder::new()
        .parse_filters(&settings.log_level)
        .init();

    if let Err(e) = run(settings) {
        error!("{}", e);
        return Err(e.into());
    }

    Ok(())
}

fn run(settings: Settings) -> Result<(), StartupError> {
    let sink: Arc<dyn LogSink> = Arc::new(LogFacade);

    let table = DeviceTable::from_settings(&settings.buttons)?;
    table.log_summary(sink.as_ref());

    // Only ARP from our buttons ever reaches the loop.
    let filter = build_filter(&table);
    info!("Starting up on interface [{}] with filter '{}'", settings.nic, filter);
    let cap = open_capture(&settings.nic, &filter)?;

    let dispatcher = Arc::new(ActionDispatcher::new(sink.clone())?);
    let spawner = Arc::new(ThreadSpawner::new(sink.clone()));

    // The capture loop runs on this thread; presses are dispatched on their own threads.
    let mut capture = CaptureLoop::new(cap, Arc::new(table), dispatcher, spawner, sink);
    match capture.run() {
        Ok(presses) => info!("Capture finished after {} press(es).", presses),
        Err(e) => error!("Capture error: {}", e),
    }

    Ok(())
}
