//! Model provider abstractions for Parley.
//!
//! - `ChatModel`: RPITIT trait for concrete provider implementations
//! - `BoxChatModel`: Object-safe wrapper for dynamic dispatch
//! - `ChatSession`: Stateful conversation seeded with prior history

pub mod box_provider;
pub mod provider;
pub mod session;
