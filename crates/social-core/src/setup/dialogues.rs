//! Dialogue Setup
//!
//! The bundled dialogue library, compiled into the binary.

use crate::dialogue::DialogueLibrary;

const DIALOGUES_JSON: &str = include_str!("../../content/dialogues.json");

/// Parse the bundled dialogue trees
pub fn load_dialogue_library() -> Result<DialogueLibrary, serde_json::Error> {
    DialogueLibrary::from_json(DIALOGUES_JSON)
}
