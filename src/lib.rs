//! autopad – input device auto-configuration from a profile database.
//!
//! Given the name an input device reports, [`matcher::auto_set_defaults`]
//! finds the best-matching profile in `InputAutoCfg.ini` and writes its
//! parameters into a [`store::ConfigStore`].

pub mod config;
pub mod copy;
pub mod devices;
pub mod matcher;
pub mod parser;
pub mod score;
pub mod store;

pub use copy::auto_copy_input_config;
pub use matcher::auto_set_defaults;
