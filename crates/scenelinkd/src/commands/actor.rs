//! Level actor commands.

use serde_json::{Value, json};

use crate::scene::{Actor, ActorKind, Scene, Transform, environment};

use super::errors::{CommandError, CommandResult};
use super::params::Params;
use super::table::HandlerTable;
use super::{environment as environment_commands, lights};

/// The `actor` group: actor CRUD plus the sky, weather, georeference and
/// control-light commands that operate on level actors.
pub(super) fn group() -> HandlerTable<Scene> {
    HandlerTable::new("actor")
        .with("get_actors_in_level", get_actors_in_level)
        .with("find_actors_by_name", find_actors_by_name)
        .with("create_actor", create_actor)
        .with("delete_actor", delete_actor)
        .with("set_actor_transform", set_actor_transform)
        .with("get_actor_properties", get_actor_properties)
        .with("get_character_actors", get_character_actors)
        .with("select_visible_actors", select_visible_actors)
        .merge(environment_commands::handlers())
        .merge(lights::handlers())
}

fn list<'a>(actors: impl Iterator<Item = &'a Actor>) -> Value {
    let actors: Vec<Value> = actors.map(|actor| actor.summary()).collect();
    json!({ "actors": actors })
}

fn get_actors_in_level(scene: &mut Scene, _params: &Params<'_>) -> CommandResult {
    Ok(list(scene.actors().iter()))
}

fn find_actors_by_name(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let pattern = params.required_str("pattern")?;
    Ok(list(scene.find_actors(pattern)))
}

fn create_actor(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let actor_type = params.required_str("type")?;
    let name = params.required_str("name")?;
    if scene.contains_actor(name) {
        return Err(CommandError::ActorExists {
            name: name.to_owned(),
        });
    }
    let kind: ActorKind = actor_type
        .trim()
        .parse()
        .map_err(|_| CommandError::UnknownActorType {
            actor_type: actor_type.to_owned(),
        })?;

    let mut transform = Transform::default();
    transform.apply(
        params.optional_vector("location")?,
        params.optional_vector("rotation")?,
        params.optional_vector("scale")?,
    );
    let actor = Actor::of_kind(name, kind).with_transform(transform);
    let summary = actor.summary();
    scene.spawn(actor);
    Ok(summary)
}

fn delete_actor(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let name = params.required_str("name")?;
    let removed = scene
        .remove_actor(name)
        .ok_or_else(|| CommandError::ActorNotFound {
            name: name.to_owned(),
        })?;
    Ok(json!({
        "deleted_actor": removed.summary(),
        "success": true,
        "message": format!("Actor deleted: {}", removed.name),
    }))
}

fn set_actor_transform(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let name = params.required_str("name")?;
    let location = params.optional_vector("location")?;
    let rotation = params.optional_vector("rotation")?;
    let scale = params.optional_vector("scale")?;
    let actor = scene
        .actor_mut(name)
        .ok_or_else(|| CommandError::ActorNotFound {
            name: name.to_owned(),
        })?;
    actor.transform.apply(location, rotation, scale);
    Ok(actor.details())
}

fn get_actor_properties(scene: &mut Scene, params: &Params<'_>) -> CommandResult {
    let name = params.required_str("name")?;
    scene
        .actor(name)
        .map(Actor::details)
        .ok_or_else(|| CommandError::ActorNotFound {
            name: name.to_owned(),
        })
}

fn get_character_actors(scene: &mut Scene, _params: &Params<'_>) -> CommandResult {
    let characters = scene
        .actors()
        .iter()
        .filter(|actor| environment::is_character(actor));
    Ok(list(characters))
}

fn select_visible_actors(scene: &mut Scene, _params: &Params<'_>) -> CommandResult {
    let visible: Vec<String> = scene
        .actors()
        .iter()
        .filter(|actor| !actor.hidden)
        .map(|actor| actor.name.clone())
        .collect();
    let count = visible.len();
    scene.select(visible.clone());
    Ok(json!({
        "selected_actors": visible,
        "selected_count": count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn table() -> HandlerTable<Scene> {
        group()
    }

    fn run(table: &HandlerTable<Scene>, scene: &mut Scene, command: &str, params: Value) -> CommandResult {
        table.run(scene, command, &params)
    }

    #[rstest]
    fn empty_level_lists_no_actors(table: HandlerTable<Scene>) {
        let mut scene = Scene::new();
        assert_eq!(
            run(&table, &mut scene, "get_actors_in_level", json!({})),
            Ok(json!({ "actors": [] }))
        );
    }

    #[rstest]
    #[case(json!({}), "Missing 'type' parameter")]
    #[case(json!({ "type": "PointLight" }), "Missing 'name' parameter")]
    #[case(json!({ "type": "Teapot", "name": "Tea" }), "Unknown actor type: Teapot")]
    fn create_actor_validates_parameters(
        table: HandlerTable<Scene>,
        #[case] params: Value,
        #[case] expected: &str,
    ) {
        let mut scene = Scene::new();
        let error = run(&table, &mut scene, "create_actor", params).expect_err("invalid request");
        assert_eq!(error.to_string(), expected);
        assert!(scene.actors().is_empty());
    }

    #[rstest]
    fn create_actor_rejects_duplicate_names(table: HandlerTable<Scene>) {
        let mut scene = Scene::new();
        let params = json!({ "type": "StaticMeshActor", "name": "Cube" });
        assert!(run(&table, &mut scene, "create_actor", params.clone()).is_ok());
        let error = run(&table, &mut scene, "create_actor", params).expect_err("duplicate");
        assert_eq!(error.to_string(), "Actor with name 'Cube' already exists");
    }

    #[rstest]
    fn created_actors_appear_in_the_level(table: HandlerTable<Scene>) {
        let mut scene = Scene::new();
        let created = run(
            &table,
            &mut scene,
            "create_actor",
            json!({ "type": "pointlight", "name": "Lamp", "location": [0, 0, 300] }),
        )
        .expect("create actor");
        assert_eq!(created["class"], "PointLight");
        assert_eq!(created["location"], json!([0.0, 0.0, 300.0]));

        let listed = run(&table, &mut scene, "get_actors_in_level", json!({})).expect("list");
        assert_eq!(listed["actors"], json!([created]));
    }

    #[rstest]
    fn delete_actor_reports_the_removed_actor(table: HandlerTable<Scene>) {
        let mut scene = Scene::with_default_environment();
        let result = run(&table, &mut scene, "delete_actor", json!({ "name": "CesiumGeoreference" }))
            .expect("delete actor");
        assert_eq!(result["success"], json!(true));
        assert_eq!(result["message"], "Actor deleted: CesiumGeoreference");
        assert!(!scene.contains_actor("CesiumGeoreference"));

        let error = run(&table, &mut scene, "delete_actor", json!({ "name": "CesiumGeoreference" }))
            .expect_err("already deleted");
        assert_eq!(error.to_string(), "Actor not found: CesiumGeoreference");
    }

    #[rstest]
    fn set_actor_transform_changes_only_given_parts(table: HandlerTable<Scene>) {
        let mut scene = Scene::with_default_environment();
        let result = run(
            &table,
            &mut scene,
            "set_actor_transform",
            json!({ "name": "BP_ThirdPersonCharacter_C_0", "rotation": [0, 90, 0] }),
        )
        .expect("set transform");
        assert_eq!(result["rotation"], json!([0.0, 90.0, 0.0]));
        assert_eq!(result["location"], json!([0.0, 0.0, 90.0]));
    }

    #[rstest]
    fn find_actors_by_name_matches_substrings(table: HandlerTable<Scene>) {
        let mut scene = Scene::with_default_environment();
        let result = run(&table, &mut scene, "find_actors_by_name", json!({ "pattern": "sky" }))
            .expect("find actors");
        assert_eq!(result["actors"].as_array().map(Vec::len), Some(1));
    }

    #[rstest]
    fn character_actors_are_filtered_by_class(table: HandlerTable<Scene>) {
        let mut scene = Scene::with_default_environment();
        let result = run(&table, &mut scene, "get_character_actors", json!({})).expect("characters");
        assert_eq!(result["actors"][0]["name"], "BP_ThirdPersonCharacter_C_0");
    }

    #[rstest]
    fn select_visible_actors_skips_hidden_ones(table: HandlerTable<Scene>) {
        let mut scene = Scene::with_default_environment();
        if let Some(actor) = scene.actor_mut("CesiumGeoreference") {
            actor.hidden = true;
        }
        let result = run(&table, &mut scene, "select_visible_actors", json!({})).expect("select");
        assert_eq!(result["selected_count"], json!(3));
        assert!(!scene.selection().iter().any(|name| name == "CesiumGeoreference"));
    }
}
