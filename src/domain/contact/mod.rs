//! Contact aggregate: the canonical person record plus its channels.

mod channels;
mod contact;
mod employer;

pub use channels::{choose_promotion, ChannelRow, EmailAddress, Location, PhoneNumber};
pub use contact::{Contact, ContactStatus};
pub use employer::{EmployerData, EmployerRecord};
