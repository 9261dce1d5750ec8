//! Repository interfaces implemented by the infrastructure layer

pub mod business;
pub mod rights;
pub mod user;

pub use business::BusinessRepository;
pub use rights::RightsRepository;
pub use user::UserRepository;

#[cfg(test)]
pub(crate) mod mock;

#[cfg(test)]
pub(crate) use mock::MockStore;
