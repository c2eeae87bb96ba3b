//! Build-time configuration helpers shared by the transducer crates.

#![cfg_attr(not(test), no_std)]

pub mod env;
