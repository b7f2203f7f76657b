//! Default values for configuration fields.
//!
//! Kept as functions so both serde `default = "..."` attributes and
//! `educe(Default)` expressions can share them.

use std::path::PathBuf;

pub mod store {
    use super::PathBuf;

    pub fn database() -> PathBuf {
        PathBuf::from("content/site.json")
    }

    pub fn themes() -> PathBuf {
        PathBuf::from("themes")
    }
}

pub mod buffer {
    use super::PathBuf;

    pub fn path() -> PathBuf {
        PathBuf::from("buffer")
    }
}

pub mod deploy {
    pub fn provider() -> String {
        "github".to_string()
    }

    pub mod github {
        pub fn branch() -> String {
            "main".to_string()
        }

        pub fn api_base() -> String {
            "https://api.github.com".to_string()
        }

        pub fn git_host() -> String {
            "github.com".to_string()
        }

        /// Fixed inter-request delay on the contents API, milliseconds.
        pub fn request_delay_ms() -> u64 {
            500
        }

        pub fn commit_message() -> String {
            "canopy publish".to_string()
        }
    }
}
