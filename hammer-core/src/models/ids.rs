use super::uuid_wrapper;

uuid_wrapper!(AuctionId, "Unique identifier for an auction");
uuid_wrapper!(
    BidderId,
    "Unique identifier for a marketplace user acting as bidder or seller"
);
