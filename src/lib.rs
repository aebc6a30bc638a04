//! Schemaprobe — experiment harness measuring how an agent's
//! structured-output configuration shapes its use of a verification tool
//! during multi-step arithmetic tasks.
//!
//! Three response-shaping modes run the same fixed task catalog: free text,
//! a finalization tool carrying the schema, and provider-enforced schema
//! output. The harness counts `validate_calculation` invocations per trial
//! and compares the means.

pub mod agent;
pub mod config;
pub mod experiment;
pub mod provider;
pub mod tools;
pub mod types;
