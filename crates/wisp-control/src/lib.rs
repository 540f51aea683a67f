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

//! # Wisp Control
//!
//! The adaptive control layer of the runtime. It watches frame durations,
//! moves the target rate along the fixed ladder, and decides how much
//! background streaming work the frame budget can afford.

#![warn(missing_docs)]

pub mod frame_rate;
pub mod metrics;
pub mod policy;

pub use frame_rate::{FrameRateController, RateChange};
pub use metrics::RingBuffer;
pub use policy::{AdaptiveLoadingPolicy, LoadSample, LoadingMode, LoadingPolicy, StreamingDirective};
