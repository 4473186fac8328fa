//! FFI layer between Rust and scripts
//!
//! Handles become string keys in the JS registry; values cross as JSON.

use serde::Deserialize;
use tether_core::ecs::{ObjectFlags, ObjectState};
use tether_core::script::{ClassRef, ModuleRef, ScriptHandle, ScriptValue};

/// Key of a handle in the JS-side registry.
pub(crate) trait RegistryKey {
    fn key(&self) -> String;
}

impl RegistryKey for ModuleRef {
    fn key(&self) -> String {
        format!("m{}", self.0)
    }
}

impl RegistryKey for ClassRef {
    fn key(&self) -> String {
        format!("c{}", self.0)
    }
}

impl RegistryKey for ScriptHandle {
    fn key(&self) -> String {
        format!("i{}", self.0)
    }
}

/// What `__tether.invoke` hands back.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Outcome {
    #[serde(default)]
    pub result: ScriptValue,
    #[serde(default)]
    pub game_object: Option<ObjectState>,
    #[serde(default)]
    pub created: Vec<CreateRequest>,
}

/// A `GameObject.create` made during the call.
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub(crate) struct CreateRequest {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[serde(default)]
    pub ui: bool,
    #[serde(default)]
    pub permanent: bool,
}

impl CreateRequest {
    pub fn flags(&self) -> ObjectFlags {
        ObjectFlags {
            ui: self.ui,
            permanent: self.permanent,
        }
    }
}

pub(crate) fn encode_args(args: &[ScriptValue]) -> Result<String, serde_json::Error> {
    serde_json::to_string(args)
}

pub(crate) fn encode_state(state: &ObjectState) -> Result<String, serde_json::Error> {
    serde_json::to_string(state)
}

pub(crate) fn decode_outcome(json: &str) -> Result<Outcome, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tether_core::Vector2;

    #[test]
    fn test_keys_are_distinct_per_kind() {
        assert_eq!(ModuleRef(3).key(), "m3");
        assert_eq!(ClassRef(3).key(), "c3");
        assert_eq!(ScriptHandle(3).key(), "i3");
    }

    #[test]
    fn test_outcome_with_state() {
        let outcome = decode_outcome(
            r#"{"result":7,"gameObject":{"position":{"x":1,"y":2},"scale":{"x":4,"y":4},"active":false}}"#,
        )
        .unwrap();
        assert_eq!(outcome.result, json!(7));
        let state = outcome.game_object.unwrap();
        assert_eq!(state.position, Vector2::new(1, 2));
        assert!(!state.active);
    }

    #[test]
    fn test_outcome_without_state() {
        let outcome = decode_outcome(r#"{"result":null,"gameObject":null}"#).unwrap();
        assert!(outcome.result.is_null());
        assert!(outcome.game_object.is_none());
        assert!(outcome.created.is_empty());
    }

    #[test]
    fn test_outcome_with_created_objects() {
        let outcome = decode_outcome(
            r#"{"result":null,"gameObject":null,"created":[{"x":1,"y":2,"w":3,"h":4,"ui":true,"permanent":false}]}"#,
        )
        .unwrap();
        assert_eq!(outcome.created.len(), 1);
        let request = &outcome.created[0];
        assert_eq!((request.x, request.y, request.w, request.h), (1, 2, 3, 4));
        assert_eq!(
            request.flags(),
            ObjectFlags {
                ui: true,
                permanent: false
            }
        );
    }

    #[test]
    fn test_fractional_position_is_rejected() {
        let result = decode_outcome(
            r#"{"result":null,"gameObject":{"position":{"x":1.5,"y":0},"scale":{"x":1,"y":1},"active":true}}"#,
        );
        assert!(result.is_err());
    }
}
