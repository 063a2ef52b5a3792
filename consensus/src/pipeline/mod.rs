//! The block insertion pipeline: validation phases, commits, virtual state.

pub mod block_processor;
pub mod template_builder;
pub mod virtual_processor;

pub use block_processor::BlockProcessor;
pub use template_builder::TemplateBuilder;
pub use virtual_processor::VirtualProcessor;
