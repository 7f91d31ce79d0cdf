//! Leptos integration helpers.

pub mod guard;
