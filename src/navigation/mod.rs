//! Stateless callback navigation
//!
//! Buttons carry the full state of the screen they lead to, encoded as a compact
//! token. This module holds the token codec, the per-kind level tables used to
//! dispatch decoded tokens, and the transport-neutral screen model.

pub mod codec;
pub mod router;
pub mod screen;

pub use codec::{
    decode, encode, CallbackToken, DecodeError, EncodeError, Field, NavArgs, NavKind,
    NavigationAction, MAX_LEVEL, MAX_TOKEN_LEN,
};
pub use router::{FlowTable, NavigationRouter, RoutingError};
pub use screen::{Button, ButtonTarget, Screen};
