#![deny(warnings)]
pub mod game;
pub mod model;
pub mod score;
pub mod split;
pub mod stats;
pub mod store;
pub mod symbols;
pub mod turn;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "tenpin"
    }

    pub const fn codename() -> &'static str {
        "Lane Keeper"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
