//! Actor System for Watch Mode
//!
//! Message-passing concurrency for watch mode:
//!
//! ```text
//! FsActor --> BuildActor --> WsActor
//! (watch)     (pipeline)   (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing
//! - `build` - Owns the pipeline and its coalescing run queue
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod build;
pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod ws;

pub use coordinator::Coordinator;
