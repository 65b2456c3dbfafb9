pub mod accounts;
pub mod events;

pub use accounts::{AccountError, AccountService};
pub use events::{EventError, EventService, Mutation, OwnerEvents};
