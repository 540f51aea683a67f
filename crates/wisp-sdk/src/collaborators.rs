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

//! The bundle of external collaborators handed to the loop at init.

use crate::logic::FrameLogic;
use crate::loop_manager::LoopError;
use std::fmt;
use wisp_control::LoadingPolicy;
use wisp_core::platform::{AssetStreamer, AudioAdapter, InputAdapter, Renderer};
use wisp_lanes::physics_lane::PhysicsLane;

/// Collaborators for [`LoopManager::init`](crate::LoopManager::init).
///
/// The renderer, audio adapter, input adapter and physics lane are
/// required. The streamer, loading policy and frame logic are optional.
#[derive(Default)]
pub struct Collaborators {
    renderer: Option<Box<dyn Renderer>>,
    audio: Option<Box<dyn AudioAdapter>>,
    input: Option<Box<dyn InputAdapter>>,
    physics: Option<Box<dyn PhysicsLane>>,
    streamer: Option<Box<dyn AssetStreamer>>,
    policy: Option<Box<dyn LoadingPolicy>>,
    logic: Option<Box<dyn FrameLogic>>,
}

impl Collaborators {
    /// An empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the renderer.
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Sets the audio adapter.
    pub fn with_audio(mut self, audio: impl AudioAdapter + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    /// Sets the input adapter.
    pub fn with_input(mut self, input: impl InputAdapter + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    /// Sets the physics lane.
    pub fn with_physics(mut self, physics: impl PhysicsLane + 'static) -> Self {
        self.physics = Some(Box::new(physics));
        self
    }

    /// Sets the asset streamer steered by the loading policy.
    pub fn with_streamer(mut self, streamer: impl AssetStreamer + 'static) -> Self {
        self.streamer = Some(Box::new(streamer));
        self
    }

    /// Sets the loading policy.
    pub fn with_policy(mut self, policy: impl LoadingPolicy + 'static) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    /// Sets the host logic.
    pub fn with_logic(mut self, logic: impl FrameLogic + 'static) -> Self {
        self.logic = Some(Box::new(logic));
        self
    }

    /// Splits the bundle into the per-frame drivers and the streaming pair,
    /// failing on the first missing required collaborator.
    pub(crate) fn into_parts(self) -> Result<(FrameDrivers, StreamingControl), LoopError> {
        let drivers = FrameDrivers {
            renderer: self.renderer.ok_or(LoopError::MissingCollaborator("renderer"))?,
            audio: self.audio.ok_or(LoopError::MissingCollaborator("audio"))?,
            input: self.input.ok_or(LoopError::MissingCollaborator("input"))?,
            physics: self.physics.ok_or(LoopError::MissingCollaborator("physics"))?,
            logic: self.logic,
        };
        let streaming = StreamingControl {
            streamer: self.streamer,
            policy: self.policy,
        };
        Ok((drivers, streaming))
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("renderer", &self.renderer.is_some())
            .field("audio", &self.audio.is_some())
            .field("input", &self.input.is_some())
            .field("physics", &self.physics.as_ref().map(|p| p.strategy_name()))
            .field("streamer", &self.streamer.is_some())
            .field("policy", &self.policy.as_ref().map(|p| p.name()))
            .field("logic", &self.logic.is_some())
            .finish()
    }
}

/// Collaborators the stage pipeline calls every frame.
pub struct FrameDrivers {
    /// Renderer.
    pub renderer: Box<dyn Renderer>,
    /// Audio adapter.
    pub audio: Box<dyn AudioAdapter>,
    /// Input adapter.
    pub input: Box<dyn InputAdapter>,
    /// Physics lane.
    pub physics: Box<dyn PhysicsLane>,
    /// Host logic, if any.
    pub logic: Option<Box<dyn FrameLogic>>,
}

impl fmt::Debug for FrameDrivers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameDrivers")
            .field("physics", &self.physics.strategy_name())
            .field("logic", &self.logic.is_some())
            .finish_non_exhaustive()
    }
}

/// The asset streamer and the policy steering it.
#[derive(Default)]
pub(crate) struct StreamingControl {
    pub(crate) streamer: Option<Box<dyn AssetStreamer>>,
    pub(crate) policy: Option<Box<dyn LoadingPolicy>>,
}
