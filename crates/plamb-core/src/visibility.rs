//! Layer-distance visibility ("onion skinning").

use crate::ids::{PlatformId, SubgridId};
use serde::{Deserialize, Serialize};

/// How objects off the active layer are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LayerVisibilityOption {
    #[default]
    Visible,
    OnionSkinning,
    Hidden,
}

/// Tint strength for onion-skinned objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TintTier {
    /// Distance -1: the object's layer number is one less than the active one.
    NearTop,
    /// Distance +1: the object's layer number is one more than the active one.
    NearBottom,
    /// Two layers away.
    Far,
}

/// What the host should do with an object's material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialDirective {
    FullyVisible,
    Tinted(TintTier),
    Hidden,
}

/// Furthest layer distance that is still tinted under onion skinning.
pub const ONION_SKIN_RANGE: i64 = 2;

/// Directive for an object on `object_layer` while `active_layer` is edited.
pub fn material_directive(
    object_layer: u32,
    active_layer: u32,
    option: LayerVisibilityOption,
) -> MaterialDirective {
    let distance = object_layer as i64 - active_layer as i64;
    if distance == 0 {
        return MaterialDirective::FullyVisible;
    }
    match option {
        LayerVisibilityOption::Visible => MaterialDirective::FullyVisible,
        LayerVisibilityOption::Hidden => MaterialDirective::Hidden,
        LayerVisibilityOption::OnionSkinning => {
            if distance.abs() > ONION_SKIN_RANGE {
                MaterialDirective::Hidden
            } else {
                MaterialDirective::Tinted(match distance {
                    -1 => TintTier::NearTop,
                    1 => TintTier::NearBottom,
                    _ => TintTier::Far,
                })
            }
        }
    }
}

/// Which object a directive applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectRef {
    Platform(PlatformId),
    Prop(PlatformId, SubgridId),
}

/// One evaluated directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectVisibility {
    pub object: ObjectRef,
    pub directive: MaterialDirective,
}
