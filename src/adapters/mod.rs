// Adapters: concrete implementations of the domain ports.

pub mod sink;
