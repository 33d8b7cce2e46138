pub mod friend_service;
pub mod message_service;

pub use friend_service::FriendService;
pub use message_service::MessageService;
