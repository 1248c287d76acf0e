//! End-to-end editing scenarios across the public API.

use kurbo::Point;
use plamb_core::{
    CommandOutcome, ConnectionId, EditorCommand, EditorSession, EditorSettings, Footprint,
    FrameInput, LayerVisibilityOption, LevelFile, LevelMetadata, LevelStorage, MaterialDirective,
    MemoryStorage, ObjectCatalog, ObjectRef, PlacementMode, PlatformId, Rotation, SaveMode,
    SubgridId, TintTier, footprint, material_directive,
};

fn session() -> EditorSession {
    EditorSession::new(EditorSettings::default(), ObjectCatalog::builtin()).unwrap()
}

fn at(x: f64, z: f64, commands: Vec<EditorCommand>) -> FrameInput {
    FrameInput {
        cursor: Some(Point::new(x, z)),
        commands,
        ..FrameInput::default()
    }
}

#[test]
fn platform_id_text_form() {
    let id = PlatformId::new(3, 2, 12).unwrap();
    assert_eq!(id.to_string(), "3C12");
    assert_eq!("3C12".parse::<PlatformId>().unwrap(), id);
}

#[test]
fn ids_round_trip_over_small_domain() {
    for level in [0, 1, 9, 10, 123] {
        for column in [0, 1, 25] {
            for row in [0, 7, 12, 400] {
                let platform = PlatformId::new(level, column, row).unwrap();
                assert_eq!(platform.to_string().parse::<PlatformId>().unwrap(), platform);

                let sub = SubgridId::new(column, row).unwrap();
                assert_eq!(sub.to_string().parse::<SubgridId>().unwrap(), sub);

                for slot in [0, 5, 9] {
                    let connection = ConnectionId::new(slot, platform, sub).unwrap();
                    assert_eq!(connection.to_string().parse::<ConnectionId>().unwrap(), connection);
                }
            }
        }
    }
}

#[test]
fn footprint_rotation_swaps_aspect() {
    let anchor = plamb_core::CellCoord::new(10, 10);
    let flat = footprint(4, 4, Rotation::Deg0, anchor);
    assert_eq!((flat.left, flat.right), (8, 11));

    let long = footprint(6, 2, Rotation::Deg0, anchor);
    let turned = footprint(6, 2, Rotation::Deg90, anchor);
    assert_eq!((long.width(), long.height()), (6, 2));
    assert_eq!((turned.width(), turned.height()), (2, 6));
}

#[test]
fn overlap_examples() {
    let a = Footprint::new(0, 0, 3, 3);
    assert!(a.overlaps(&Footprint::new(2, 2, 5, 5)));
    assert!(!a.overlaps(&Footprint::new(4, 0, 7, 3)));
}

#[test]
fn onion_skin_examples() {
    let onion = LayerVisibilityOption::OnionSkinning;
    assert_eq!(material_directive(4, 5, onion), MaterialDirective::Tinted(TintTier::NearTop));
    assert_eq!(material_directive(2, 5, onion), MaterialDirective::Hidden);
}

#[test]
fn build_a_playable_level_and_store_it() {
    let mut session = session();

    // Two floors next to each other on the starting layer
    session.tick(at(1.0, 1.0, vec![EditorCommand::Select("floor".into()), EditorCommand::Commit]));
    session.tick(at(5.0, 1.0, vec![EditorCommand::Commit]));
    assert_eq!(session.registry().len(), 2);

    // Start on the first, goal on the second, a rotated bench next to the start
    session.tick(at(1.0, 1.0, vec![EditorCommand::Select("level_start".into()), EditorCommand::Commit]));
    session.tick(at(5.0, 1.0, vec![EditorCommand::Select("level_goal".into()), EditorCommand::Commit]));
    let report = session.tick(at(
        2.6,
        2.6,
        vec![
            EditorCommand::Select("bench".into()),
            EditorCommand::Rotate(1),
            EditorCommand::Commit,
        ],
    ));
    assert_eq!(report.outcomes[1], CommandOutcome::Rotated(Rotation::Deg90));
    assert!(matches!(report.outcomes[2], CommandOutcome::Placed(ObjectRef::Prop(..))));
    assert!(session.registry().is_playable());

    let storage = MemoryStorage::new();
    let level = session.export_level(LevelMetadata {
        level_name: "First steps".into(),
        ..LevelMetadata::default()
    });
    storage.save("first-steps", &level, SaveMode::CreateNew).unwrap();

    let mut reloaded = self::session();
    reloaded.load_level(&storage.load("first-steps").unwrap()).unwrap();
    assert_eq!(reloaded.registry(), session.registry());
}

#[test]
fn second_prop_on_same_slot_is_noop() {
    let mut session = session();
    session.tick(at(1.0, 1.0, vec![EditorCommand::Select("floor".into()), EditorCommand::Commit]));
    let report = session.tick(at(
        1.0,
        1.0,
        vec![
            EditorCommand::Select("crate".into()),
            EditorCommand::Commit,
            EditorCommand::Select("lever".into()),
            EditorCommand::Commit,
        ],
    ));
    assert!(matches!(report.outcomes[1], CommandOutcome::Placed(_)));
    assert_eq!(report.outcomes[3], CommandOutcome::Ignored);

    let platform = session.registry().get("5M11".parse().unwrap()).unwrap();
    assert_eq!(platform.prop_count(), 1);
}

#[test]
fn clear_layer_and_cancel_between_ticks() {
    let mut session = session();
    session.tick(at(1.0, 1.0, vec![EditorCommand::Select("floor".into()), EditorCommand::Commit]));
    session.tick(FrameInput {
        commands: vec![EditorCommand::StepLayer(-1), EditorCommand::Commit],
        ..FrameInput::default()
    });
    assert_eq!(session.registry().len(), 2);

    session.on_mode_changed(PlacementMode::None);
    assert!(session.ghost().is_none());

    let level = session.export_level(LevelMetadata::default());
    let mut registry = level.into_registry(session.catalog(), session.settings()).unwrap();
    assert_eq!(registry.clear_layer(4), 1);
    assert_eq!(registry.len(), 1);

    let json = LevelFile::from_registry(&registry, LevelMetadata::default()).to_json().unwrap();
    assert!(json.contains("\"5M11\""));
    assert!(!json.contains("\"4M11\""));
}
