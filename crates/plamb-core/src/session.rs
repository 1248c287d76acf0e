//! Editor session: owns every component and runs the per-frame pipeline.
//!
//! Each [`EditorSession::tick`] maps the cursor first, then recomputes
//! placement validity, then applies the frame's discrete commands in order.
//! A command that fails is reported in the frame and the rest still run.
//! The same entry points can also be called directly between ticks.

use crate::catalog::{CatalogError, ObjectCatalog};
use crate::footprint::Rotation;
use crate::grid::{CursorTarget, GridKind, GridMapper, GridPosition};
use crate::ids::{PlatformId, SubgridId};
use crate::level::{LevelError, LevelFile, LevelMetadata};
use crate::placeable::{LevelObject, Placeable};
use crate::placement::PlacementValidator;
use crate::registry::{PlacementRegistry, RegistryError};
use crate::settings::{EditorSettings, SettingsError};
use crate::visibility::{LayerVisibilityOption, ObjectRef, ObjectVisibility, material_directive};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error("Layer {layer} is out of range (layer count {count})")]
    LayerOutOfRange { layer: u32, count: u32 },
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// What a commit does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMode {
    #[default]
    None,
    Build,
    Delete,
    Duplicate,
}

/// A discrete user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorCommand {
    Commit,
    Rotate(i32),
    SetMode(PlacementMode),
    Select(String),
    StepLayer(i32),
    SetLayerVisibility {
        layer: u32,
        option: LayerVisibilityOption,
    },
}

/// Everything the host reports for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameInput {
    /// Grid-plane hit point, if the cursor ray hit the plane this frame.
    pub cursor: Option<Point>,
    /// Pointer is over a UI element; cursor mapping and commits are skipped.
    pub pointer_over_ui: bool,
    /// Object under the cursor, as reported by the host's picking.
    pub hovered: Option<ObjectRef>,
    pub commands: Vec<EditorCommand>,
}

/// Result of one command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOutcome {
    Placed(ObjectRef),
    Deleted(ObjectRef),
    Duplicated(String),
    Selected(String),
    Rotated(Rotation),
    ModeChanged(PlacementMode),
    LayerChanged(u32),
    VisibilityChanged {
        layer: u32,
        option: LayerVisibilityOption,
    },
    /// The command had no effect in the current state.
    Ignored,
    /// The command was rejected; nothing it would have changed was changed.
    Failed(String),
}

/// What changed during one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub platform_id: Option<PlatformId>,
    pub subgrid_id: Option<SubgridId>,
    pub hovered_space_is_free: bool,
    /// Where the host should draw the ghost object.
    pub ghost_position: Option<Point>,
    pub outcomes: Vec<CommandOutcome>,
    /// Directives for every object, when the layer or a visibility option changed.
    pub visibility: Option<Vec<ObjectVisibility>>,
}

/// A single-user editing session over one level.
pub struct EditorSession {
    settings: EditorSettings,
    mapper: GridMapper,
    validator: PlacementValidator,
    registry: PlacementRegistry,
    catalog: ObjectCatalog,
    active_layer: u32,
    layer_options: Vec<LayerVisibilityOption>,
    mode: PlacementMode,
    ghost: Option<Placeable>,
    last_point: Option<Point>,
    position: Option<GridPosition>,
    cursor: Option<CursorTarget>,
    hovered: Option<ObjectRef>,
    hovered_space_is_free: bool,
    input_blocked: bool,
}

impl EditorSession {
    pub fn new(settings: EditorSettings, catalog: ObjectCatalog) -> SessionResult<Self> {
        settings.validate()?;
        log::info!(
            "Starting editor session with {} layers and {} catalog entries",
            settings.layer_count,
            catalog.len()
        );
        Ok(Self {
            mapper: GridMapper::new(&settings),
            validator: PlacementValidator::new(settings.sub_cells_per_main_cell),
            registry: PlacementRegistry::new(),
            catalog,
            active_layer: settings.initial_layer(),
            layer_options: vec![LayerVisibilityOption::default(); settings.layer_count as usize],
            mode: PlacementMode::None,
            ghost: None,
            last_point: None,
            position: None,
            cursor: None,
            hovered: None,
            hovered_space_is_free: false,
            input_blocked: false,
            settings,
        })
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn registry(&self) -> &PlacementRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &ObjectCatalog {
        &self.catalog
    }

    pub fn active_layer(&self) -> u32 {
        self.active_layer
    }

    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    /// The object waiting to be placed, in Build mode.
    pub fn ghost(&self) -> Option<&Placeable> {
        self.ghost.as_ref()
    }

    pub fn cursor_target(&self) -> Option<CursorTarget> {
        self.cursor
    }

    pub fn hovered(&self) -> Option<ObjectRef> {
        self.hovered
    }

    pub fn hovered_space_is_free(&self) -> bool {
        self.hovered_space_is_free
    }

    pub fn layer_visibility(&self, layer: u32) -> Option<LayerVisibilityOption> {
        self.layer_options.get(layer as usize).copied()
    }

    /// Replace the registry with the contents of a level file.
    pub fn load_level(&mut self, level: &LevelFile) -> SessionResult<()> {
        let registry = level.into_registry(&self.catalog, &self.settings)?;
        self.registry = registry;
        self.hovered = None;
        self.refresh_validity();
        Ok(())
    }

    /// Export the current registry.
    pub fn export_level(&self, metadata: LevelMetadata) -> LevelFile {
        LevelFile::from_registry(&self.registry, metadata)
    }

    /// Map a grid-plane hit point to the ids it addresses on the active layer.
    pub fn on_cursor_moved(&mut self, point: Point) {
        self.last_point = Some(point);
        self.position = self.mapper.map_world_point(point);
        self.cursor = self.mapper.cursor_target(point, self.active_layer);
        self.refresh_validity();
    }

    pub fn on_hover_changed(&mut self, hovered: Option<ObjectRef>) {
        self.hovered = hovered;
    }

    /// Start placing objects of the given lookup key.
    pub fn select_object(&mut self, lookup_key: &str) -> SessionResult<()> {
        let ghost = self.catalog.instantiate(lookup_key)?;
        self.ghost = Some(ghost);
        self.mode = PlacementMode::Build;
        log::debug!("Selected {} for placement", lookup_key);
        self.refresh_validity();
        Ok(())
    }

    /// Switch placement mode. Any ghost object is discarded.
    pub fn on_mode_changed(&mut self, mode: PlacementMode) {
        self.ghost = None;
        self.mode = mode;
        self.hovered_space_is_free = false;
        log::debug!("Placement mode set to {:?}", mode);
    }

    /// Rotate the ghost by quarter turns. Only has an effect in Build mode.
    pub fn on_rotate_requested(&mut self, quarter_turns: i32) -> Option<Rotation> {
        if self.mode != PlacementMode::Build {
            return None;
        }
        let ghost = self.ghost.as_mut()?;
        let rotation = ghost.rotation().rotated_by(quarter_turns);
        ghost.set_rotation(rotation);
        self.refresh_validity();
        Some(rotation)
    }

    /// Apply the current mode at the current cursor.
    pub fn on_commit_requested(&mut self) -> SessionResult<CommandOutcome> {
        if self.input_blocked {
            return Ok(CommandOutcome::Ignored);
        }
        let outcome = match self.mode {
            PlacementMode::Build => self.commit_build(),
            PlacementMode::Delete => self.commit_delete(),
            PlacementMode::Duplicate => self.commit_duplicate(),
            PlacementMode::None => Ok(CommandOutcome::Ignored),
        };
        self.refresh_validity();
        outcome
    }

    /// Move the active layer by `delta`. Steps that would leave the layer range are ignored.
    pub fn on_layer_step(&mut self, delta: i32) -> Option<u32> {
        let target = self.active_layer as i64 + delta as i64;
        if delta == 0 || target < 0 || target >= self.settings.layer_count as i64 {
            return None;
        }
        self.active_layer = target as u32;
        if let Some(point) = self.last_point {
            self.cursor = self.mapper.cursor_target(point, self.active_layer);
        }
        self.refresh_validity();
        log::debug!("Active layer is now {}", self.active_layer);
        Some(self.active_layer)
    }

    pub fn set_layer_visibility(&mut self, layer: u32, option: LayerVisibilityOption) -> SessionResult<()> {
        let count = self.settings.layer_count;
        let slot = self
            .layer_options
            .get_mut(layer as usize)
            .ok_or(SessionError::LayerOutOfRange { layer, count })?;
        *slot = option;
        Ok(())
    }

    /// Material directive for every placed object.
    ///
    /// Props share their platform's layer, and each object uses the option of
    /// the layer it sits on.
    pub fn visibility(&self) -> Vec<ObjectVisibility> {
        let mut directives = Vec::new();
        for (platform_id, platform) in self.registry.platforms() {
            let layer = platform_id.level();
            let option = self.layer_visibility(layer).unwrap_or_default();
            let directive = material_directive(layer, self.active_layer, option);
            directives.push(ObjectVisibility {
                object: ObjectRef::Platform(platform_id),
                directive,
            });
            for prop in platform.props() {
                if let Some(slot) = prop.subgrid_id() {
                    directives.push(ObjectVisibility {
                        object: ObjectRef::Prop(platform_id, slot),
                        directive,
                    });
                }
            }
        }
        directives
    }

    /// Where the ghost should be drawn, if there is one and the cursor has been mapped.
    pub fn ghost_position(&self) -> Option<Point> {
        let ghost = self.ghost.as_ref()?;
        let position = self.position.as_ref()?;
        let kind = if ghost.is_platform() {
            GridKind::Main
        } else {
            GridKind::Sub
        };
        let info = ghost.info();
        Some(
            self.mapper
                .ghost_world_position(position, kind, info.length(), info.width(), info.rotation()),
        )
    }

    /// Run one frame: cursor mapping, then validity, then commands in order.
    ///
    /// Pointer blocking only lasts for the frame it was reported in.
    pub fn tick(&mut self, input: FrameInput) -> FrameReport {
        self.input_blocked = input.pointer_over_ui;
        if !self.input_blocked {
            if let Some(point) = input.cursor {
                self.on_cursor_moved(point);
            }
            self.on_hover_changed(input.hovered);
        }
        self.refresh_validity();

        let mut outcomes = Vec::with_capacity(input.commands.len());
        let mut visibility_dirty = false;
        for command in input.commands {
            let outcome = match command {
                EditorCommand::Commit => self.on_commit_requested().unwrap_or_else(failed),
                EditorCommand::Rotate(steps) => self
                    .on_rotate_requested(steps)
                    .map_or(CommandOutcome::Ignored, CommandOutcome::Rotated),
                EditorCommand::SetMode(mode) => {
                    self.on_mode_changed(mode);
                    CommandOutcome::ModeChanged(mode)
                }
                EditorCommand::Select(key) => match self.select_object(&key) {
                    Ok(()) => CommandOutcome::Selected(key),
                    Err(err) => failed(err),
                },
                EditorCommand::StepLayer(delta) => match self.on_layer_step(delta) {
                    Some(layer) => {
                        visibility_dirty = true;
                        CommandOutcome::LayerChanged(layer)
                    }
                    None => CommandOutcome::Ignored,
                },
                EditorCommand::SetLayerVisibility { layer, option } => {
                    match self.set_layer_visibility(layer, option) {
                        Ok(()) => {
                            visibility_dirty = true;
                            CommandOutcome::VisibilityChanged { layer, option }
                        }
                        Err(err) => failed(err),
                    }
                }
            };
            outcomes.push(outcome);
        }
        self.input_blocked = false;

        FrameReport {
            platform_id: self.cursor.map(|target| target.platform_id),
            subgrid_id: self.cursor.map(|target| target.subgrid_id),
            hovered_space_is_free: self.hovered_space_is_free,
            ghost_position: self.ghost_position(),
            outcomes,
            visibility: visibility_dirty.then(|| self.visibility()),
        }
    }

    fn refresh_validity(&mut self) {
        self.hovered_space_is_free = match (self.mode, &self.ghost, self.cursor) {
            (PlacementMode::Build, Some(ghost), Some(target)) => match ghost {
                Placeable::Platform(_) => self
                    .validator
                    .can_place_platform(&self.registry, target.platform_id),
                Placeable::Prop(prop) => {
                    let candidate = prop.footprint_at(target.sub);
                    self.validator
                        .can_place_prop(&self.registry, target.platform_id, &candidate)
                }
            },
            _ => false,
        };
    }

    fn commit_build(&mut self) -> SessionResult<CommandOutcome> {
        let Some(target) = self.cursor else {
            return Ok(CommandOutcome::Ignored);
        };
        if !self.hovered_space_is_free {
            return Ok(CommandOutcome::Ignored);
        }
        // The ghost stays in place until the registry has accepted the copy
        let Some(ghost) = self.ghost.clone() else {
            return Ok(CommandOutcome::Ignored);
        };
        let lookup_key = ghost.lookup_key().to_string();

        let placed = match ghost {
            Placeable::Platform(platform) => self
                .registry
                .place(target.platform_id, platform)
                .then_some(ObjectRef::Platform(target.platform_id)),
            Placeable::Prop(prop) => {
                if prop.kind.is_unique() {
                    let removed = self.registry.delete_props_of_type(prop.kind)?;
                    if removed > 0 {
                        log::info!("Replaced existing {:?}", prop.kind);
                    }
                }
                self.registry
                    .place_on_platform(target.platform_id, target.subgrid_id, prop)?
                    .then_some(ObjectRef::Prop(target.platform_id, target.subgrid_id))
            }
        };

        // Fresh ghost of the same kind for the next placement
        self.ghost = Some(self.catalog.instantiate(&lookup_key)?);

        Ok(match placed {
            Some(object) => {
                log::info!("Placed {} at {:?}", lookup_key, object);
                CommandOutcome::Placed(object)
            }
            None => {
                log::warn!("Placement of {} was refused by the registry", lookup_key);
                CommandOutcome::Ignored
            }
        })
    }

    fn commit_delete(&mut self) -> SessionResult<CommandOutcome> {
        let Some(object) = self.hovered else {
            return Ok(CommandOutcome::Ignored);
        };
        match object {
            ObjectRef::Platform(platform_id) => {
                self.registry.remove(platform_id)?;
            }
            ObjectRef::Prop(platform_id, slot) => {
                self.registry
                    .remove_from_platform(platform_id, slot)?
                    .ok_or(RegistryError::PropNotFound {
                        platform: platform_id,
                        slot,
                    })?;
            }
        }
        self.hovered = None;
        log::info!("Deleted {:?}", object);
        Ok(CommandOutcome::Deleted(object))
    }

    fn commit_duplicate(&mut self) -> SessionResult<CommandOutcome> {
        let Some(object) = self.hovered else {
            return Ok(CommandOutcome::Ignored);
        };
        let lookup_key = match object {
            ObjectRef::Platform(platform_id) => self
                .registry
                .get(platform_id)
                .map(|platform| platform.lookup_key().to_string()),
            ObjectRef::Prop(platform_id, slot) => self
                .registry
                .get(platform_id)
                .and_then(|platform| platform.prop(slot))
                .map(|prop| prop.lookup_key().to_string()),
        };
        let Some(lookup_key) = lookup_key else {
            log::warn!("Hovered object {:?} is not registered", object);
            return Ok(CommandOutcome::Ignored);
        };
        self.select_object(&lookup_key)?;
        Ok(CommandOutcome::Duplicated(lookup_key))
    }
}

fn failed(err: SessionError) -> CommandOutcome {
    log::warn!("Command failed: {}", err);
    CommandOutcome::Failed(err.to_string())
}
