//! Optical response of planar multilayer stacks.
//!
//! A [`structure::Structure`] is a list of homogeneous layers between two
//! semi-infinite media. Plane waves are propagated through it with scattering
//! matrices combined by a star product, which stays stable for thick and
//! absorbing layers. On top of that machinery the crate computes
//!
//! - reflection and transmission coefficients ([`coefficient::coefficient`]),
//! - the power absorbed in each layer ([`absorption::absorption`]),
//! - the field map of a Gaussian beam ([`field::field`]),
//! - guided modes as poles of the reflection coefficient ([`modes`]) and their
//!   profiles ([`profile::profile`]).
//!
//! Wavelengths and thicknesses are in nm. The single point solvers take the
//! angle of incidence in radians, the sweeps in [`sweep`] take degrees.

pub mod absorption;
pub mod beam;
pub mod cascade;
pub mod coefficient;
pub mod config;
pub mod database;
pub mod error;
pub mod field;
pub mod fresnel;
pub mod material;
pub mod modes;
pub mod output;
pub mod powers;
pub mod problem;
pub mod profile;
pub mod result;
pub mod settings;
pub mod snell;
pub mod structure;
pub mod sweep;
