pub mod constants;
pub mod genesis;
pub mod params;

pub use genesis::GenesisBlock;
pub use params::Params;
