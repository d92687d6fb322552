pub mod evaluation;

pub use evaluation::evaluate_network;
