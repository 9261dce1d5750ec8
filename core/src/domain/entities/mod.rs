//! Domain entities

pub mod business;
pub mod rights;
pub mod token;
pub mod user;

pub use business::{
    Address, AddressPatch, Business, BusinessAggregate, BusinessPatch, Contact, ContactPatch,
    NewAddress, NewBusiness, NewContact, UniqueKeys,
};
pub use rights::{BusinessUserRights, Capability, RightsFlags, RightsPatch};
pub use token::{Claims, TokenKind, TokenPair};
pub use user::{User, UserView, DEFAULT_PROFILE_PICTURE};
