pub mod message;
pub mod router;
