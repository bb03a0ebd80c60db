mod store;

pub use store::{AuctionStore, BidConflict};
