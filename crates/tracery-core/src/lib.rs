//! Tracery Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Tracery parser,
//! renderer and command-line tool. It includes:
//!
//! - **Sources**: Raw diagram text tagged with its syntax ([`source::DiagramSource`])
//! - **Semantic model**: Format-independent nodes and edges ([`semantic`] module)
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)

pub mod color;
pub mod geometry;
pub mod semantic;
pub mod source;
