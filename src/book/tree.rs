use tracing::warn;

use crate::models::ChapterNode;

/// Rebuilds the volume/chapter tree from nodes sorted by index.
///
/// A node whose `volume_to` names an already placed top-level volume becomes
/// its child. Otherwise, including forward references to a volume that comes
/// later, it is appended as a top-level node. Only one level of nesting exists.
pub fn assemble(nodes: Vec<ChapterNode>) -> Vec<ChapterNode> {
    let mut tree: Vec<ChapterNode> = Vec::new();

    for node in nodes {
        let parent = node
            .volume_to
            .as_deref()
            .and_then(|target| tree.iter().position(|placed| placed.volume.as_deref() == Some(target)));

        match parent {
            Some(position) => tree[position].children.push(node),
            None => {
                if let Some(target) = &node.volume_to {
                    warn!("Chapter '{}' refers to unknown volume {}, kept at top level", node.name, target);
                }
                tree.push(node);
            }
        }
    }

    tree
}
