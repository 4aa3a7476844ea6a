pub mod aggregate;
pub mod category;
pub mod collector;
pub mod cpu;
pub mod descriptor;
pub mod enumerator;
pub mod kill;
pub mod memory;
pub mod platform;
pub mod process;
pub mod snapshot;
pub mod timebase;
