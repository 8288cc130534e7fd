//! This module provides reusable test utilities:
//! - Mock HTTP servers (panel, release feed)
//! - Test configuration builders
//! - Common test data

// Allow unused code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_panel;
pub mod mock_release_feed;
pub mod test_config;
pub mod test_data;

// Re-export commonly used items
pub use mock_panel::MockPanelServer;
pub use mock_release_feed::MockReleaseFeed;
pub use test_config::{server_config, TestConfigBuilder};
pub use test_data::*;
