//! Inter-session communication tools: send and receive agent messages.

pub mod receive_messages;
pub mod send_message;
