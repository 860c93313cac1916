//! Integration test suite for unipm.
//!
//! End-to-end tests that run the compiled binary. Everything here works
//! against temporary directories and never talks to the network: the
//! update configuration tests point `UNIPM_CONFIG_DIR` at a scratch
//! directory, and the detection tests build throwaway projects on disk.
//!
//! ```bash
//! cargo test --test integration
//! ```

mod detect;
mod update_self_config;
