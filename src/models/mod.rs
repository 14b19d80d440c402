pub mod interval;
pub mod practice;
pub mod sample;

pub use interval::{HostTimeline, Interval, Timeline};
pub use practice::{Note, PracticePiece};
pub use sample::{hour_key, FocusedApp, HourlyBatch, Sample};
