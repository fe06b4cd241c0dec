//! Ports module for Block Structure
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::{BlockStructureApi, ProduceBlockRequest, ProducedBlock, ValidationContext};
pub use outbound::{ShardExecution, TransactionExecutor, WasmTranslator};
