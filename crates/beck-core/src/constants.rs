//! Protocol constants. All monetary values in becks (1 BECK = 10^8 becks).

pub const COIN: u64 = 100_000_000;
