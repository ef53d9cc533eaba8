//! In-memory level state owned by the host thread.
//!
//! [`Scene`] is the host value the executor hands to command handlers. It is
//! never shared: every read and write happens inside a job on the host loop,
//! so it carries no locks of its own.

use std::collections::VecDeque;

mod actor;
mod blueprint;
pub mod environment;
mod math;

pub use self::actor::{Actor, ActorKind};
pub use self::blueprint::{
    BLUEPRINT_PACKAGE_PATH, Blueprint, Component, GraphNode, InputMapping, NodeKind, NodeLink,
    Variable, resolve_component_type,
};
pub use self::math::{Color, Transform, Vector3};

use self::environment::{CONTROL_LIGHT_TAG, GEOREFERENCE_CLASS, SKY_CLASS, WEATHER_CLASS};

/// Number of recent screenshot requests kept for inspection.
pub const CAPTURE_HISTORY: usize = 64;

/// Size of the active editor viewport in pixels.
pub const VIEWPORT_SIZE: (u32, u32) = (1920, 1080);

/// Where the editor viewport is looking.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportFocus {
    pub target: Option<String>,
    pub location: Vector3,
    pub distance: f64,
    pub orientation: Vector3,
}

impl Default for ViewportFocus {
    fn default() -> Self {
        Self {
            target: None,
            location: Vector3::ZERO,
            distance: 1000.0,
            orientation: Vector3::new(-30.0, 0.0, 0.0),
        }
    }
}

/// A screenshot the editor was asked to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub filepath: String,
    pub width: u32,
    pub height: u32,
}

/// Level contents and editor state.
#[derive(Debug, Default)]
pub struct Scene {
    actors: Vec<Actor>,
    blueprints: Vec<Blueprint>,
    input_mappings: Vec<InputMapping>,
    viewport: ViewportFocus,
    captures: VecDeque<Capture>,
    captures_taken: u64,
    selection: Vec<String>,
    node_serial: u64,
}

impl Scene {
    /// Creates an empty level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a level containing the sky, weather, georeference and
    /// character actors a project normally ships with.
    #[must_use]
    pub fn with_default_environment() -> Self {
        let mut scene = Self::new();
        scene.spawn(environment::sky(environment::DEFAULT_SKY_NAME));
        scene.spawn(environment::weather(environment::DEFAULT_WEATHER_NAME));
        scene.spawn(environment::georeference(GEOREFERENCE_CLASS));
        scene.spawn(environment::character(environment::DEFAULT_CHARACTER_NAME));
        scene
    }

    /// All actors in spawn order.
    #[must_use]
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Looks up an actor by exact name.
    #[must_use]
    pub fn actor(&self, name: &str) -> Option<&Actor> {
        self.actors.iter().find(|actor| actor.name == name)
    }

    /// Looks up an actor by exact name for modification.
    pub fn actor_mut(&mut self, name: &str) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|actor| actor.name == name)
    }

    /// Returns `true` when an actor called `name` exists.
    #[must_use]
    pub fn contains_actor(&self, name: &str) -> bool {
        self.actor(name).is_some()
    }

    /// Adds `actor` to the level. Callers check name uniqueness first.
    pub fn spawn(&mut self, actor: Actor) {
        self.actors.push(actor);
    }

    /// Removes and returns the actor called `name`.
    pub fn remove_actor(&mut self, name: &str) -> Option<Actor> {
        let index = self.actors.iter().position(|actor| actor.name == name)?;
        self.selection.retain(|selected| selected != name);
        Some(self.actors.remove(index))
    }

    /// Actors whose name contains `pattern`, ignoring case.
    pub fn find_actors<'a>(&'a self, pattern: &str) -> impl Iterator<Item = &'a Actor> + 'a {
        let needle = pattern.to_lowercase();
        self.actors
            .iter()
            .filter(move |actor| actor.name.to_lowercase().contains(&needle))
    }

    /// The sky actor called `name`.
    #[must_use]
    pub fn sky(&self, name: &str) -> Option<&Actor> {
        self.actor(name).filter(|actor| actor.class == SKY_CLASS)
    }

    /// The sky actor called `name`, for modification.
    pub fn sky_mut(&mut self, name: &str) -> Option<&mut Actor> {
        self.actor_mut(name).filter(|actor| actor.class == SKY_CLASS)
    }

    /// The first sky actor in the level.
    #[must_use]
    pub fn first_sky(&self) -> Option<&Actor> {
        self.first_of_class(SKY_CLASS)
    }

    /// The first sky actor in the level, for modification.
    pub fn first_sky_mut(&mut self) -> Option<&mut Actor> {
        self.first_of_class_mut(SKY_CLASS)
    }

    /// The first weather actor in the level.
    #[must_use]
    pub fn weather(&self) -> Option<&Actor> {
        self.first_of_class(WEATHER_CLASS)
    }

    /// The first weather actor in the level, for modification.
    pub fn weather_mut(&mut self) -> Option<&mut Actor> {
        self.first_of_class_mut(WEATHER_CLASS)
    }

    /// The first georeference actor in the level.
    #[must_use]
    pub fn georeference(&self) -> Option<&Actor> {
        self.first_of_class(GEOREFERENCE_CLASS)
    }

    /// The first georeference actor in the level, for modification.
    pub fn georeference_mut(&mut self) -> Option<&mut Actor> {
        self.first_of_class_mut(GEOREFERENCE_CLASS)
    }

    /// Control lights in spawn order.
    pub fn control_lights(&self) -> impl Iterator<Item = &Actor> {
        self.actors
            .iter()
            .filter(|actor| actor.has_tag(CONTROL_LIGHT_TAG))
    }

    /// The control light called `name`, for modification.
    pub fn control_light_mut(&mut self, name: &str) -> Option<&mut Actor> {
        self.actor_mut(name)
            .filter(|actor| actor.has_tag(CONTROL_LIGHT_TAG))
    }

    /// Removes the control light called `name`.
    pub fn remove_control_light(&mut self, name: &str) -> Option<Actor> {
        if !self.actor(name).is_some_and(|actor| actor.has_tag(CONTROL_LIGHT_TAG)) {
            return None;
        }
        self.remove_actor(name)
    }

    /// Names of selected actors.
    #[must_use]
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Replaces the editor selection.
    pub fn select(&mut self, names: Vec<String>) {
        self.selection = names;
    }

    /// All Blueprint assets.
    #[must_use]
    pub fn blueprints(&self) -> &[Blueprint] {
        &self.blueprints
    }

    /// Looks up a Blueprint by name.
    #[must_use]
    pub fn blueprint(&self, name: &str) -> Option<&Blueprint> {
        self.blueprints.iter().find(|blueprint| blueprint.name == name)
    }

    /// Looks up a Blueprint by name for modification.
    pub fn blueprint_mut(&mut self, name: &str) -> Option<&mut Blueprint> {
        self.blueprints
            .iter_mut()
            .find(|blueprint| blueprint.name == name)
    }

    /// Adds a Blueprint asset. Callers check name uniqueness first.
    pub fn add_blueprint(&mut self, blueprint: Blueprint) {
        self.blueprints.push(blueprint);
    }

    /// Project input mappings.
    #[must_use]
    pub fn input_mappings(&self) -> &[InputMapping] {
        &self.input_mappings
    }

    /// Adds or rebinds an input action.
    pub fn map_input(&mut self, mapping: InputMapping) {
        if let Some(existing) = self
            .input_mappings
            .iter_mut()
            .find(|existing| existing.action_name == mapping.action_name && existing.key == mapping.key)
        {
            *existing = mapping;
        } else {
            self.input_mappings.push(mapping);
        }
    }

    /// Current viewport focus.
    #[must_use]
    pub const fn viewport(&self) -> &ViewportFocus {
        &self.viewport
    }

    /// Moves the viewport.
    pub fn focus(&mut self, focus: ViewportFocus) {
        self.viewport = focus;
    }

    /// The most recent screenshot requests, oldest first; at most
    /// [`CAPTURE_HISTORY`] are kept.
    #[must_use]
    pub const fn captures(&self) -> &VecDeque<Capture> {
        &self.captures
    }

    /// Total screenshot requests recorded, including those no longer kept.
    #[must_use]
    pub const fn captures_taken(&self) -> u64 {
        self.captures_taken
    }

    /// Records a screenshot request, dropping the oldest beyond the history
    /// limit.
    pub fn record_capture(&mut self, capture: Capture) {
        if self.captures.len() == CAPTURE_HISTORY {
            self.captures.pop_front();
        }
        self.captures.push_back(capture);
        self.captures_taken += 1;
    }

    /// Allocates a graph node identifier: 32 uppercase hexadecimal digits,
    /// never repeated within this scene.
    pub fn next_node_id(&mut self) -> String {
        self.node_serial += 1;
        let high = scramble(self.node_serial);
        let low = scramble(high ^ self.node_serial.rotate_left(32));
        format!("{high:016X}{low:016X}")
    }

    fn first_of_class(&self, class: &str) -> Option<&Actor> {
        self.actors.iter().find(|actor| actor.class == class)
    }

    fn first_of_class_mut(&mut self, class: &str) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|actor| actor.class == class)
    }
}

/// Bijective 64-bit mixer, so distinct serials give distinct high halves.
const fn scramble(value: u64) -> u64 {
    let mut mixed = value.wrapping_add(0x9E37_79B9_7F4A_7C15);
    mixed = (mixed ^ (mixed >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    mixed = (mixed ^ (mixed >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    mixed ^ (mixed >> 31)
}
