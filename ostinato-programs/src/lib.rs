//! Control programs for the Eurorack module
//!
//! This crate provides the algorithms and the concrete programs the
//! runtime in ostinato-core hosts:
//!
//! - Euclidean pulse distribution and a probabilistic shift register
//! - Tempo clock, quantizer scales, non-blocking gate pulses
//! - Seedable pseudo-random source
//! - Seven programs and the default program registry

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod clock;
pub mod euclid;
pub mod gates;
pub mod programs;
pub mod rng;
pub mod scales;
pub mod shift_register;

pub use programs::default_registry;
