use crate::classifier::classify_frame;
use crate::device::DeviceTable;
use crate::dispatch::{Dispatch, TaskSpawner};
use crate::error::StartupError;
use crate::filter::optimize_filter;
use crate::logging::LogSink;
use pcap::{Active, Capture};
use std::sync::Arc;

/// Anything that hands out captured frames one at a time.
///
/// `Ok(None)` means the handle was closed and the loop should stop.
pub trait FrameSource {
    type Error;

    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, Self::Error>;
}

impl FrameSource for Capture<Active> {
    type Error = pcap::Error;

    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, pcap::Error> {
        loop {
            match self.next_packet() {
                // Owned copy so the handle can be borrowed again for the next read.
                Ok(packet) => return Ok(Some(packet.data.to_vec())),
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(pcap::Error::NoMorePackets) => return Ok(None),
                Err(e) => return Err(e),
            }
        }
    }
}

/// Opens `interface_name` for live capture and installs `filter`.
///
/// Promiscuous, and reads block until a frame arrives.
pub fn open_capture(interface_name: &str, filter: &str) -> Result<Capture<Active>, StartupError> {
    let mut cap = Capture::from_device(interface_name)?
        .promisc(true)
        .snaplen(65535)
        .timeout(0)
        .open()?;

    cap.filter(filter, optimize_filter(filter)).map_err(|source| StartupError::Filter {
        filter: filter.to_string(),
        source,
    })?;

    Ok(cap)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Initializing,
    Listening,
    Classifying,
    Dispatching,
    Terminated,
}

/// Reads frames, matches them against the device table and hands every match
/// off to the spawner. Owns the frame source; nothing else reads from it.
pub struct CaptureLoop<S> {
    source: S,
    table: Arc<DeviceTable>,
    dispatcher: Arc<dyn Dispatch>,
    spawner: Arc<dyn TaskSpawner>,
    sink: Arc<dyn LogSink>,
    state: LoopState,
}

impl<S: FrameSource> CaptureLoop<S> {
    pub fn new(
        source: S,
        table: Arc<DeviceTable>,
        dispatcher: Arc<dyn Dispatch>,
        spawner: Arc<dyn TaskSpawner>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        CaptureLoop {
            source,
            table,
            dispatcher,
            spawner,
            sink,
            state: LoopState::Initializing,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Runs until the source is closed, returning how many presses were
    /// dispatched. Never waits on a dispatch task.
    pub fn run(&mut self) -> Result<u64, S::Error> {
        self.sink.info("Listening for Dash buttons...");
        let mut dispatched = 0;

        loop {
            self.state = LoopState::Listening;
            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    self.state = LoopState::Terminated;
                    return Err(e);
                }
            };

            self.state = LoopState::Classifying;
            let Some(device) = classify_frame(&frame, &self.table, self.sink.as_ref()) else {
                continue;
            };

            self.state = LoopState::Dispatching;
            self.sink.info(&format!("Button {} was pressed.", device.name));
            let action = device.action.clone();
            let dispatcher = Arc::clone(&self.dispatcher);
            self.spawner.spawn(Box::new(move || dispatcher.dispatch(&action)));
            dispatched += 1;
        }

        self.state = LoopState::Terminated;
        self.sink.info("Capture handle closed, stopping.");
        Ok(dispatched)
    }
}
