//! Typed access to the tables behind the GraphQL backend. Every operation is
//! parameterized through `variables`; no user input is spliced into query text.

pub mod friends;
pub mod messages;
pub mod notifications;
pub mod users;

pub use friends::FriendRepository;
pub use messages::{MessageRepository, NewMessage};
pub use notifications::NotificationRepository;
pub use users::UserRepository;
