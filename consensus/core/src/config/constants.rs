/// Current block version accepted by consensus.
pub const BLOCK_VERSION: u16 = 1;

/// Transaction version produced by the coinbase builder.
pub const TX_VERSION: u16 = 0;

/// Number of sompi per coin unit.
pub const SOMPI_PER_COIN: u64 = 100_000_000;
