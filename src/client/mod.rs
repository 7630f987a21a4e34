//! Client-side application model: upload state machine, chat view,
//! transcription history, and search. Transport is left to the caller;
//! the controller emits effects describing the relay calls to make.

pub mod controller;
pub mod history;
pub mod search;
