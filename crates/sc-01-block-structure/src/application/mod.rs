//! Application layer: block assembly and the service orchestrating
//! validation, execution and signing.

pub mod assembly;
pub mod service;

pub use assembly::BlockAssembler;
pub use service::BlockStructureService;
