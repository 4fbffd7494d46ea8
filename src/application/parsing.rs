//! # Action Grammar Parser
//!
//! Turns one model response (prose interleaved with tagged blocks) into an
//! ordered sequence of typed [`Action`]s. Pure text-in, actions-out; nothing
//! in here is fatal — malformed input degrades to best-effort extraction.

use crate::domain::types::Action;
use regex::Regex;
use std::sync::OnceLock;

/// Closed file-write block: `<webforgeFile path="...">body</webforgeFile>`.
/// The body is captured verbatim, including internal whitespace. The path
/// attribute is taken raw — no HTML-entity unescaping.
fn file_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<webforgeFile\b[^>]*?\bpath="([^"]*)"[^>]*>(.*?)</webforgeFile>"#)
            .unwrap()
    })
}

/// Closed shell-command block: `<webforgeShell>command</webforgeShell>`.
fn shell_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<webforgeShell\b[^>]*>(.*?)</webforgeShell>").unwrap()
    })
}

/// Opening file tag on its own, used to recover an unterminated block.
fn file_open_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<webforgeFile\b[^>]*?\bpath="([^"]*)"[^>]*>"#).unwrap()
    })
}

fn shell_open_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<webforgeShell\b[^>]*>").unwrap())
}

/// Parses the full text of one model response into ordered actions.
///
/// Recognized blocks are emitted in document order. Text outside any
/// recognized block is concatenated and, when non-empty after trimming,
/// emitted as a single leading [`Action::Description`]. Unrecognized tags
/// produce no action. An unterminated block extends to the end of input
/// (streamed responses are routinely cut mid-block).
pub fn parse_actions(response: &str) -> Vec<Action> {
    // (start, end, action). Spans are kept so prose and document order
    // can be reconstructed afterwards.
    let mut matches: Vec<(usize, usize, Action)> = Vec::new();

    for caps in file_block_regex().captures_iter(response) {
        if let (Some(whole), Some(path), Some(body)) = (caps.get(0), caps.get(1), caps.get(2)) {
            matches.push((
                whole.start(),
                whole.end(),
                Action::CreateFile {
                    path: path.as_str().to_string(),
                    // Verbatim. Do not trim file content.
                    content: body.as_str().to_string(),
                },
            ));
        }
    }

    for caps in shell_block_regex().captures_iter(response) {
        if let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) {
            matches.push((
                whole.start(),
                whole.end(),
                Action::RunCommand {
                    command: body.as_str().trim().to_string(),
                },
            ));
        }
    }

    // Recover at most one unterminated block: the earliest opening tag that
    // is not part of an already-consumed span runs to the end of input.
    let covered = |pos: usize| matches.iter().any(|(s, e, _)| pos >= *s && pos < *e);
    let mut dangling: Option<(usize, usize, Action)> = None;

    for caps in file_open_regex().captures_iter(response) {
        if let (Some(tag), Some(path)) = (caps.get(0), caps.get(1)) {
            if covered(tag.start()) {
                continue;
            }
            if dangling.as_ref().is_none_or(|(s, _, _)| tag.start() < *s) {
                dangling = Some((
                    tag.start(),
                    response.len(),
                    Action::CreateFile {
                        path: path.as_str().to_string(),
                        content: response[tag.end()..].to_string(),
                    },
                ));
            }
        }
    }
    for tag in shell_open_regex().find_iter(response) {
        if covered(tag.start()) {
            continue;
        }
        if dangling.as_ref().is_none_or(|(s, _, _)| tag.start() < *s) {
            dangling = Some((
                tag.start(),
                response.len(),
                Action::RunCommand {
                    command: response[tag.end()..].trim().to_string(),
                },
            ));
        }
    }
    if let Some(d) = dangling {
        tracing::warn!("unterminated block at byte {}, extending to end of input", d.0);
        // Drop closed matches swallowed by the recovered span. A dangling
        // open tag means everything after it was meant as block body.
        matches.retain(|(s, _, _)| *s < d.0);
        matches.push(d);
    }

    // Document order.
    matches.sort_by_key(|m| m.0);

    // Everything outside consumed spans is prose.
    let mut prose = String::new();
    let mut cursor = 0;
    for (start, end, _) in &matches {
        if *start > cursor {
            prose.push_str(&response[cursor..*start]);
        }
        cursor = (*end).max(cursor);
    }
    if cursor < response.len() {
        prose.push_str(&response[cursor..]);
    }

    let mut actions: Vec<Action> = Vec::with_capacity(matches.len() + 1);
    let prose = prose.trim();
    if !prose.is_empty() {
        actions.push(Action::Description(prose.to_string()));
    }
    actions.extend(matches.into_iter().map(|(_, _, action)| action));
    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_prose_yields_single_description() {
        let actions = parse_actions("I'll set up a todo app for you.");
        assert_eq!(
            actions,
            vec![Action::Description(
                "I'll set up a todo app for you.".to_string()
            )]
        );
    }

    #[test]
    fn empty_response_yields_no_actions() {
        assert!(parse_actions("").is_empty());
        assert!(parse_actions("  \n\t ").is_empty());
    }

    #[test]
    fn file_block_content_is_verbatim() {
        let response = "<webforgeFile path=\"src/app.js\">\nline one\n  line two\n</webforgeFile>";
        let actions = parse_actions(response);
        assert_eq!(
            actions,
            vec![Action::CreateFile {
                path: "src/app.js".to_string(),
                content: "\nline one\n  line two\n".to_string(),
            }]
        );
    }

    #[test]
    fn empty_body_produces_empty_content() {
        let actions = parse_actions("<webforgeFile path=\".gitkeep\"></webforgeFile>");
        assert_eq!(
            actions,
            vec![Action::CreateFile {
                path: ".gitkeep".to_string(),
                content: String::new(),
            }]
        );
    }

    #[test]
    fn shell_command_is_trimmed() {
        let actions = parse_actions("<webforgeShell>\n  npm install\n</webforgeShell>");
        assert_eq!(
            actions,
            vec![Action::RunCommand {
                command: "npm install".to_string()
            }]
        );
    }

    #[test]
    fn prose_around_blocks_becomes_leading_description() {
        let response = "Here's the entry point.\n\
            <webforgeFile path=\"index.html\">HI</webforgeFile>\n\
            Then install dependencies:\n\
            <webforgeShell>npm install</webforgeShell>";
        let actions = parse_actions(response);
        assert_eq!(actions.len(), 3);
        assert_eq!(
            actions[0],
            Action::Description("Here's the entry point.\n\nThen install dependencies:".to_string())
        );
        assert_eq!(
            actions[1],
            Action::CreateFile {
                path: "index.html".to_string(),
                content: "HI".to_string()
            }
        );
        assert_eq!(
            actions[2],
            Action::RunCommand {
                command: "npm install".to_string()
            }
        );
    }

    #[test]
    fn blocks_keep_document_order() {
        let response = "<webforgeShell>npm run dev</webforgeShell>\
            <webforgeFile path=\"a.txt\">A</webforgeFile>\
            <webforgeShell>echo done</webforgeShell>";
        let actions = parse_actions(response);
        assert_eq!(
            actions,
            vec![
                Action::RunCommand {
                    command: "npm run dev".to_string()
                },
                Action::CreateFile {
                    path: "a.txt".to_string(),
                    content: "A".to_string()
                },
                Action::RunCommand {
                    command: "echo done".to_string()
                },
            ]
        );
    }

    #[test]
    fn extra_attributes_are_tolerated() {
        let actions =
            parse_actions("<webforgeFile lang=\"js\" path=\"a.js\" final=\"true\">x</webforgeFile>");
        assert_eq!(
            actions,
            vec![Action::CreateFile {
                path: "a.js".to_string(),
                content: "x".to_string()
            }]
        );
    }

    #[test]
    fn html_entities_are_not_unescaped() {
        let actions = parse_actions(
            "<webforgeFile path=\"a&amp;b.txt\">&lt;div&gt;</webforgeFile>",
        );
        assert_eq!(
            actions,
            vec![Action::CreateFile {
                path: "a&amp;b.txt".to_string(),
                content: "&lt;div&gt;".to_string()
            }]
        );
    }

    #[test]
    fn unrecognized_tags_produce_no_file_or_command() {
        let actions = parse_actions("<webforgeThinking>hmm</webforgeThinking>");
        assert!(actions.iter().all(|a| matches!(a, Action::Description(_))));
    }

    #[test]
    fn unterminated_file_block_extends_to_end_of_input() {
        let response = "<webforgeFile path=\"src/main.js\">console.log(1);\nconsole.log(2);";
        let actions = parse_actions(response);
        assert_eq!(
            actions,
            vec![Action::CreateFile {
                path: "src/main.js".to_string(),
                content: "console.log(1);\nconsole.log(2);".to_string(),
            }]
        );
    }

    #[test]
    fn closed_block_before_unterminated_block_survives() {
        let response = "<webforgeFile path=\"a.txt\">A</webforgeFile>\
            <webforgeFile path=\"b.txt\">truncated";
        let actions = parse_actions(response);
        assert_eq!(
            actions,
            vec![
                Action::CreateFile {
                    path: "a.txt".to_string(),
                    content: "A".to_string()
                },
                Action::CreateFile {
                    path: "b.txt".to_string(),
                    content: "truncated".to_string()
                },
            ]
        );
    }

    #[test]
    fn malformed_open_tag_without_path_is_ignored() {
        let actions = parse_actions("<webforgeFile>no path here</webforgeFile>");
        assert!(
            actions
                .iter()
                .all(|a| !matches!(a, Action::CreateFile { .. }))
        );
    }
}
