pub mod command_dispatch;
pub mod command_execution;
pub mod deferred_delivery;
pub mod instance_directory;
pub mod observability;
pub mod response_builder;
