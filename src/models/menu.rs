use serde::{Deserialize, Serialize};

/// One node of the permission menu.
///
/// The backend filters the tree by the caller's effective permissions
/// before it is sent; a node's presence already implies access. The
/// client never re-derives visibility from raw permission strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuNode {
    /// The resource path this node points at, e.g. `/student/grades`.
    pub path: String,
    /// The display label, localized for the requested locale.
    pub label: String,
    /// The permission strings the server required for this node.
    /// Empty means public.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Child nodes.
    #[serde(default)]
    pub children: Vec<MenuNode>,
}

/// The permission menu for one (session, locale) pair.
///
/// Replaced wholesale on every fetch; never patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuTree {
    /// Top-level nodes, in server order.
    pub items: Vec<MenuNode>,
}

impl MenuTree {
    /// Creates a tree from top-level nodes.
    pub fn new(items: Vec<MenuNode>) -> Self {
        Self { items }
    }

    /// Whether `path` is present anywhere in the tree (depth-first).
    pub fn contains_path(&self, path: &str) -> bool {
        fn walk(nodes: &[MenuNode], path: &str) -> bool {
            for node in nodes {
                if node.path == path {
                    return true;
                }
                if walk(&node.children, path) {
                    return true;
                }
            }
            false
        }
        walk(&self.items, path)
    }

    /// Returns every path in the tree, depth-first.
    pub fn paths(&self) -> Vec<&str> {
        fn walk<'a>(nodes: &'a [MenuNode], out: &mut Vec<&'a str>) {
            for node in nodes {
                out.push(node.path.as_str());
                walk(&node.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.items, &mut out);
        out
    }
}
