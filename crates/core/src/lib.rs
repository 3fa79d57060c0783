//! Domain layer of the scenecut client.
//!
//! Wire envelopes, the validation pass, resource locators, the job form,
//! the rendered result view and the page state machine. Nothing in this
//! crate performs I/O.

pub mod envelope;
pub mod error;
pub mod form;
pub mod locator;
pub mod page;
pub mod payload;
pub mod render;
pub mod types;
pub mod validate;
pub mod view;
