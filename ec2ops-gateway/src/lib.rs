//! Chat-command gateway for EC2 instances.
//!
//! Slash commands and interactive button clicks arrive on one HTTP endpoint,
//! are parsed into actions, executed against a [`ec2ops_providers::ComputeProvider`],
//! and answered inline or through the platform's callback URL.

pub mod config;
pub mod features;
pub mod server;
pub mod shared;
