#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod burst;
pub mod dynamics;
pub mod engine;
pub mod filter;
pub mod frame;
pub mod frame_manager;
pub mod noise;
pub mod tract;
pub mod utils;
pub mod voice;
