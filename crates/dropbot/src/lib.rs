//! Umbrella crate that re-exports the `dropbot-*` building blocks.
//!
//! - [`core`]: ids, blackboard, deterministic RNG, tick context
//! - [`bt`]: priority selectors with decorators and interval services
//! - [`agents`]: the bot lifecycle and decision tasks, spawn POIs, and the manager
//! - [`tools`]: decision traces

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use dropbot_core as core;

#[cfg(feature = "tools")]
#[cfg_attr(docsrs, doc(cfg(feature = "tools")))]
pub use dropbot_tools as tools;

#[cfg(feature = "bt")]
#[cfg_attr(docsrs, doc(cfg(feature = "bt")))]
pub use dropbot_bt as bt;

#[cfg(feature = "agents")]
#[cfg_attr(docsrs, doc(cfg(feature = "agents")))]
pub use dropbot_agents as agents;
