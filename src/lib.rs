// In src/lib.rs
mod capture;
mod classifier;
mod device;
mod dispatch;
mod error;
mod filter;
mod logging;
mod settings;

pub use capture::{CaptureLoop, FrameSource, LoopState, open_capture};
pub use classifier::{classify, classify_frame, classify_str, source_address};
pub use device::{Device, DeviceTable, parse_hardware_address};
pub use dispatch::{
    ActionDispatcher, ActionSpec, DigestAction, DirectAction, Dispatch, SendAction, Task, TaskSpawner,
    ThreadSpawner,
};
pub use error::StartupError;
pub use filter::{MATCH_NOTHING, build_filter, optimize_filter};
pub use logging::{LogFacade, LogSink};
pub use settings::{ButtonSettings, DEFAULT_CONFIG_PATH, Settings};
