// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Wisp Core
//!
//! Foundational crate containing the core types and collaborator contracts of
//! the Wisp frame runtime: geometry, entity and region records, the frame
//! clock, runtime configuration and the abstract telemetry types.

#![warn(missing_docs)]

pub mod config;
pub mod control;
pub mod math;
pub mod physics;
pub mod platform;
pub mod telemetry;
pub mod time;
pub mod utils;

pub use config::{ConfigError, RuntimeConfig};
pub use control::FrameRate;
pub use time::{ManualClock, SystemClock, TimeSource, Timekeeper};
