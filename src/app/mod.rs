pub mod command_service;
