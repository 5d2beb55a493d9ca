pub mod location;
pub mod matched;
pub mod municipality;
pub mod radiation;
pub mod source;
pub mod weather;
