pub mod collector;
pub mod network;

pub use collector::{default_source, CounterSource, ProcNetDev, SysinfoNetworks};
pub use network::{CounterSnapshot, DeltaRow};
