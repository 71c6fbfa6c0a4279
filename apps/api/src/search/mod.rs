// Search API access: the raw client, the four email sources built on it,
// and the profile lookup that feeds contact analysis.

pub mod client;
pub mod profiles;
pub mod sources;
