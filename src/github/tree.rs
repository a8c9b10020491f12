//! Tree loading helpers: request paths, the submodule file and nesting.

use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::error::{AppError, Result};
use crate::models::{EntryType, NodeType, Submodules, TreeItem, TreeNode, TreeNodeRef};

pub const GITMODULES: &str = ".gitmodules";

/// Characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Decode then re-encode, so both `feature/x` and `feature%2Fx` become
/// `feature%2Fx`. Escapes that do not decode to UTF-8 are rejected rather
/// than replaced, since that would name a different branch.
pub fn encode_branch(branch: &str) -> Result<String> {
    let decoded = percent_decode_str(branch)
        .decode_utf8()
        .map_err(|_| AppError::InvalidRequest(format!("malformed branch name: {}", branch)))?;
    Ok(utf8_percent_encode(&decoded, COMPONENT).to_string())
}

/// Path under the repository for a tree request: the node's subtree when
/// drilling in, otherwise the whole branch recursively.
pub fn tree_path(branch: &str, node: Option<&TreeNodeRef>) -> Result<String> {
    let encoded = encode_branch(branch)?;
    Ok(match node {
        Some(node) => match node.sha.as_deref().filter(|s| !s.is_empty()) {
            Some(sha) => format!("/git/trees/{}", sha),
            None => format!("/git/trees/{}", encoded),
        },
        None => format!("/git/trees/{}?recursive=1", encoded),
    })
}

pub fn blob_path(sha: &str) -> String {
    format!("/git/blobs/{}", sha)
}

pub fn find_gitmodules(tree: &[TreeNode]) -> Option<&TreeNode> {
    tree.iter().find(|n| n.path.eq_ignore_ascii_case(GITMODULES))
}

/// Blob API content is base64 wrapped at 60 columns.
pub fn decode_blob(content: &str) -> Result<String> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| AppError::Decode(format!("blob is not base64: {}", e)))?;
    String::from_utf8(bytes).map_err(|_| AppError::Decode("blob is not valid UTF-8".to_string()))
}

fn sort_items(items: &mut [TreeItem]) {
    items.sort_by(|a, b| match (&a.entry_type, &b.entry_type) {
        (EntryType::Directory, EntryType::Directory) => {
            a.name.to_lowercase().cmp(&b.name.to_lowercase())
        }
        (EntryType::Directory, _) => std::cmp::Ordering::Less,
        (_, EntryType::Directory) => std::cmp::Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });
}

/// Fold a listing into nested items, directories first.
///
/// With `recursive` the listing is a whole branch and directories get their
/// children; otherwise it is one directory (whose path is `base_path`) and
/// directories are left unexpanded.
pub fn nest_tree(
    nodes: &[TreeNode],
    base_path: &str,
    recursive: bool,
    submodules: Option<&Submodules>,
) -> Vec<TreeItem> {
    let mut by_parent: HashMap<&str, Vec<&TreeNode>> = HashMap::new();
    for node in nodes {
        let parent = if recursive {
            node.path.rsplit_once('/').map(|(p, _)| p).unwrap_or("")
        } else {
            ""
        };
        by_parent.entry(parent).or_default().push(node);
    }

    fn build(
        parent: &str,
        by_parent: &HashMap<&str, Vec<&TreeNode>>,
        base_path: &str,
        recursive: bool,
        submodules: Option<&Submodules>,
    ) -> Vec<TreeItem> {
        let Some(children) = by_parent.get(parent) else {
            return Vec::new();
        };

        let mut items: Vec<TreeItem> = children
            .iter()
            .map(|node| {
                let name = node.path.rsplit('/').next().unwrap_or(&node.path).to_string();
                let path = if base_path.is_empty() {
                    node.path.clone()
                } else {
                    format!("{}/{}", base_path.trim_end_matches('/'), node.path)
                };

                let entry_type = match node.node_type {
                    NodeType::Blob => EntryType::File,
                    NodeType::Tree => EntryType::Directory,
                    NodeType::Commit => EntryType::Submodule,
                };

                let children = if recursive && entry_type == EntryType::Directory {
                    Some(build(&node.path, by_parent, base_path, recursive, submodules))
                } else {
                    None
                };

                let submodule_url = if entry_type == EntryType::Submodule {
                    submodules.and_then(|s| s.get(&path)).map(|s| s.url.clone())
                } else {
                    None
                };

                TreeItem {
                    name,
                    path,
                    sha: node.sha.clone(),
                    entry_type,
                    size: node.size,
                    submodule_url,
                    children,
                }
            })
            .collect();

        sort_items(&mut items);
        items
    }

    build("", &by_parent, base_path, recursive, submodules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Submodule;

    fn node(path: &str, node_type: NodeType) -> TreeNode {
        TreeNode {
            path: path.to_string(),
            sha: format!("sha-{}", path),
            node_type,
            size: None,
        }
    }

    #[test]
    fn test_tree_path_for_node() {
        let node = TreeNodeRef {
            sha: Some("abc123".to_string()),
            path: Some("src".to_string()),
        };
        assert_eq!(tree_path("main", Some(&node)).unwrap(), "/git/trees/abc123");
    }

    #[test]
    fn test_tree_path_for_root() {
        assert_eq!(tree_path("main", None).unwrap(), "/git/trees/main?recursive=1");
        assert_eq!(
            tree_path("feature/x", None).unwrap(),
            "/git/trees/feature%2Fx?recursive=1"
        );
    }

    #[test]
    fn test_tree_path_node_without_sha_uses_branch() {
        assert_eq!(
            tree_path("main", Some(&TreeNodeRef::default())).unwrap(),
            "/git/trees/main"
        );
    }

    #[test]
    fn test_encode_branch_is_stable() {
        assert_eq!(encode_branch("feature%2Fx").unwrap(), "feature%2Fx");
        assert_eq!(encode_branch("v1.0-rc").unwrap(), "v1.0-rc");
        assert_eq!(encode_branch("a b").unwrap(), "a%20b");
    }

    #[test]
    fn test_malformed_branch_escape_rejected() {
        assert!(matches!(
            encode_branch("release%FF"),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(tree_path("release%FF", None).is_err());
    }

    #[test]
    fn test_find_gitmodules() {
        let tree = vec![node("src", NodeType::Tree), node(".GitModules", NodeType::Blob)];
        assert_eq!(find_gitmodules(&tree).map(|n| n.sha.as_str()), Some("sha-.GitModules"));

        let tree = vec![node("vendor/.gitmodules", NodeType::Blob)];
        assert!(find_gitmodules(&tree).is_none());
    }

    #[test]
    fn test_decode_blob_ignores_line_breaks() {
        assert_eq!(decode_blob("aGVs\nbG8=\n").unwrap(), "hello");
        assert!(decode_blob("%%%").is_err());
    }

    #[test]
    fn test_nest_recursive_listing() {
        let nodes = vec![
            node("README.md", NodeType::Blob),
            node("src", NodeType::Tree),
            node("src/main.rs", NodeType::Blob),
            node("src/app", NodeType::Tree),
            node("src/app/mod.rs", NodeType::Blob),
            node("vendor", NodeType::Commit),
        ];
        let mut submodules = Submodules::new();
        submodules.insert(
            "vendor".to_string(),
            Submodule {
                name: "vendor".to_string(),
                url: "https://github.com/acme/vendor.git".to_string(),
                branch: None,
            },
        );

        let items = nest_tree(&nodes, "", true, Some(&submodules));
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["src", "README.md", "vendor"]);

        let src = items[0].children.as_ref().unwrap();
        assert_eq!(src[0].name, "app");
        assert_eq!(src[0].path, "src/app");
        assert_eq!(src[1].path, "src/main.rs");
        assert_eq!(src[0].children.as_ref().unwrap()[0].path, "src/app/mod.rs");

        assert_eq!(
            items[2].submodule_url.as_deref(),
            Some("https://github.com/acme/vendor.git")
        );
    }

    #[test]
    fn test_nest_single_directory() {
        let nodes = vec![node("mod.rs", NodeType::Blob), node("nested", NodeType::Tree)];
        let items = nest_tree(&nodes, "src/app", false, None);
        assert_eq!(items[0].path, "src/app/nested");
        assert!(items[0].children.is_none());
        assert_eq!(items[1].path, "src/app/mod.rs");
    }
}
