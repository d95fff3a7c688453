//! Research Bank E2E Test Framework
//!
//! Browser tests driven from Rust:
//! - Spawns `researchbank-web` against a fixture catalogue
//! - Parses declarative YAML test specs
//! - Runs each spec as one Playwright script in a fresh browser context
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── start_server() -> ServerHandle                       │
//! │    └── run_spec(spec: TestSpec) -> TestResult               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestSpec (YAML)                                            │
//! │    ├── name, description, tags                              │
//! │    └── steps: [Step]                                        │
//! │          ├── navigate { url }                               │
//! │          ├── click { selector } / click_text { text }       │
//! │          ├── fill { selector, value } / press { key }       │
//! │          ├── wait { selector }                              │
//! │          ├── assert { selector, text?, value?, count? }     │
//! │          └── assert_path { path }                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod playwright;
pub mod runner;
pub mod server;
pub mod spec;

pub use error::{E2eError, E2eResult};
pub use runner::TestRunner;
pub use spec::{TestSpec, TestStep};
