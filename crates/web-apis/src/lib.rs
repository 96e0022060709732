//! Clients for the public web APIs behind the fun commands.

mod dog;
mod error;
mod jokes;
mod sicepat;

pub use dog::{DogClient, DogMedia};
pub use error::ApiError;
pub use jokes::{ChuckNorrisClient, ChuckNorrisJoke, DadJoke, DadJokeClient};
pub use sicepat::{LastStatus, SiCepatClient, TrackEvent, Tracking, TrackingStatus, Waybill};
