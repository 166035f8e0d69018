mod hero_remote;

pub use hero_remote::{HeroRemote, HeroRemoteError, HttpHeroRemote, RepositoryHeroRemote};
