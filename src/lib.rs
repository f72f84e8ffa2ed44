pub mod config;
pub mod dealer;
pub mod deckgen;
pub mod error;
pub mod input;
pub mod keychannel;
pub mod keygen;
pub mod model;
pub mod oracle;
pub mod player;
pub mod table;
pub mod tokio_tools;
pub mod ui;

#[cfg(test)]
pub mod test_support;
