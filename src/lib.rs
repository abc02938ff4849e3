//! Pure Rust async implementation of the [RCON protocol](https://wiki.vg/RCON) as spoken by Minecraft servers.
pub mod client;
pub mod error;
pub mod packet;
mod transport;
