//! Clients for the external data node and verification services

pub mod data_node;
pub mod messages;
pub mod verifier;

pub use data_node::DataNodeClient;
pub use verifier::VerifierClient;
