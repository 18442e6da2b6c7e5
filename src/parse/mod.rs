//! Readers and writers for the artifact formats.

pub mod obj;
