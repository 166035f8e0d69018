mod gallery;

pub use gallery::*;
