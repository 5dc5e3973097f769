//! Atelier: live task board for a design studio.
//!
//! The crate keeps an in-memory copy of every live design task in line with
//! the system of record and sorts those tasks into the columns of a board.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports
//! - **Services**: Orchestration over ports and domain types
//!
//! # Modules
//!
//! - [`task`]: The denormalized task read model and the fetcher port
//! - [`sync`]: Change events, the task store, and the reconciler
//! - [`board`]: Rule-based bucket classification and board views

pub mod board;
pub mod sync;
pub mod task;
