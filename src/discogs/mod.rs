pub mod client;
pub mod models;

pub use client::{DiscogsClient, DiscogsError};
pub use models::{
    DiscogsArtist, DiscogsFormat, DiscogsImage, DiscogsLabel, DiscogsRelease, DiscogsSearchResult,
    DiscogsTrack, PaginationInfo, SearchPage,
};
