/// Command and message handlers
pub mod handlers;
/// Long message splitting and sending
pub mod messaging;
/// Fixed texts shown to users
pub mod views;
