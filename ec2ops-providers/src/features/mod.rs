pub mod ec2_api;
