//! # Prompts
//!
//! Prompt templates shipped with the binary. The system prompt fixes the
//! tag grammar the parser expects; the starter template is a tagged
//! payload fed through the same parse path as a model response.

pub const SYSTEM_PROMPT: &str = include_str!("../prompts/system.md");
pub const REACT_TEMPLATE: &str = include_str!("../prompts/templates/react.md");

/// The user turn that carries the starter scaffold into the transcript,
/// so later model turns build on top of it instead of regenerating it.
pub fn template_turn() -> String {
    format!(
        "The project has been initialized with the following starter files. \
         Build on top of them; emit a webforgeFile block whenever a file \
         should change.\n\n{REACT_TEMPLATE}"
    )
}

#[cfg(test)]
mod tests {
    use crate::application::parsing::parse_actions;
    use crate::domain::types::Action;

    #[test]
    fn starter_template_parses_into_file_writes() {
        let actions = parse_actions(super::REACT_TEMPLATE);
        let paths: Vec<_> = actions
            .iter()
            .filter_map(|a| match a {
                Action::CreateFile { path, .. } => Some(path.as_str()),
                _ => None,
            })
            .collect();
        assert!(paths.contains(&"package.json"));
        assert!(paths.contains(&"index.html"));
        assert!(paths.contains(&"src/main.jsx"));
        assert!(paths.contains(&"src/App.jsx"));
    }

    #[test]
    fn system_prompt_names_both_tags() {
        assert!(super::SYSTEM_PROMPT.contains("webforgeFile"));
        assert!(super::SYSTEM_PROMPT.contains("webforgeShell"));
    }
}
