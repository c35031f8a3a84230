//! Service probes
//!
//! End-to-end and integration probes that exercise a remote system and
//! assert on its observable response:
//!
//! - **browser-title** (`e2e`): drives headless Chrome through a remote
//!   WebDriver endpoint, loads a page and checks its title and heading
//! - **health** (`integration`): GETs a service's `/health` endpoint and
//!   checks the status code and, in the strict variant, the payload
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  ProbeRunner(ProbeConfig)                                   │
//! │    ├── run_all() / run_tagged(tag) / run_probe(name)        │
//! │    └── SuiteReport { ProbeReport* }                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  browser::run_browser_probe(&BrowserProbeConfig)            │
//! │    ├── WebDriverClient::new_session() -> Session            │
//! │    ├── navigate → Wait(title) → Wait(h1) → assert           │
//! │    └── Session::quit()            (Drop deletes otherwise)  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  health::run_health_probe(&HealthProbeConfig)               │
//! │    └── GET <base_url>/health → 200 → (strict) status == ok  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures carry an [`ErrorKind`]: infrastructure, timeout or assertion.

pub mod browser;
pub mod config;
pub mod error;
pub mod health;
pub mod output;
pub mod runner;
pub mod wait;
pub mod webdriver;

pub use browser::{run_browser_probe, PageObservation};
pub use config::{BrowserProbeConfig, CapabilityStyle, HealthProbeConfig, ProbeConfig, Strictness};
pub use error::{ErrorKind, ProbeError, ProbeResult};
pub use health::{run_health_probe, HealthObservation};
pub use runner::{ProbeKind, ProbeReport, ProbeRunner, SuiteReport};
