pub mod logic_data;
pub mod progression;
pub mod seed;
pub mod settings;
pub mod spoiler_log;
