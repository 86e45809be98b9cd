//! Procedural macros for the Herald bot framework.
//!
//! This crate provides:
//!
//! - `#[derive(Event)]` - Implements `herald_core::Event` for a type
//! - `#[listener]` - Builds a `herald_core::Listener` handler table from
//!   `#[handler]` methods
//!
//! # Event Derive Macro
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! #[derive(Debug, Event)]
//! #[event(name = "member.joined")]
//! pub struct MemberJoined {
//!     pub user_id: String,
//! }
//! ```
//!
//! # Listener Attribute Macro
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! struct Audit;
//!
//! #[listener]
//! impl Audit {
//!     #[handler]
//!     async fn on_join(&self, event: &MemberJoined) -> anyhow::Result<()> {
//!         tracing::info!(user = %event.user_id, "member joined");
//!         Ok(())
//!     }
//!
//!     #[handler]
//!     fn on_anything(&self, event: &BoxedEvent) {
//!         tracing::trace!(name = event.event_name(), "event seen");
//!     }
//! }
//! ```

mod event;
mod listener;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemImpl, parse_macro_input};

/// Derives `herald_core::Event`.
///
/// # Attributes
///
/// - `#[event(name = "...")]` - Override the event name. Defaults to the
///   type name in snake_case.
#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match event::derive_event(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Implements `herald_core::Listener` for the type of an inherent impl block.
///
/// Every method marked `#[handler]` becomes an entry in the listener's
/// handler table, in declaration order. A handler takes `&self` and one
/// event parameter:
///
/// - `&T` receives events whose concrete type is exactly `T`
/// - `&BoxedEvent` or `&dyn Event` receives every event
///
/// `#[handler(any)]` requires one of those two catch-all parameters and is a
/// compile error on any other type.
///
/// A handler with no event parameter still compiles, but registering the
/// listener fails with `DispatchError::InvalidHandlerSignature`.
///
/// # Attributes
///
/// - `#[listener(name = "...")]` - Name used in logs and failure reports.
///   Defaults to the type name.
#[proc_macro_attribute]
pub fn listener(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = listener::ListenerArgs::default();
    let parser = syn::meta::parser(|meta| args.parse(meta));
    parse_macro_input!(attr with parser);
    let item = parse_macro_input!(item as ItemImpl);

    match listener::expand_listener(args, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
