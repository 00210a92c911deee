use crate::Project;

/// Groups active projects into a two-level tree.
///
/// Every active project without a parent becomes a root, and every active project whose parent
/// is such a root is attached as its child. Deeper descendants are not nested and do not appear
/// in the output. Roots and children keep their input order.
pub fn build_project_tree(projects: Vec<Project>) -> Vec<Project> {
    let active: Vec<Project> = projects.into_iter().filter(Project::is_active).collect();

    active
        .iter()
        .filter(|p| p.parent_id().is_none())
        .map(|root| {
            let children = active
                .iter()
                .filter(|p| p.parent_id() == Some(root.id))
                .map(|child| Project {
                    children: Vec::new(),
                    ..child.clone()
                })
                .collect();

            Project {
                children,
                ..root.clone()
            }
        })
        .collect()
}

/// Finds the root that owns `project_id` in a tree built by [`build_project_tree`]: either the
/// root itself or the root one of whose children has that id.
pub fn find_root_project(tree: &[Project], project_id: u64) -> Option<&Project> {
    tree.iter()
        .find(|root| root.id == project_id || root.children.iter().any(|c| c.id == project_id))
}

/// Serializes a project tree for storage alongside a connection.
pub fn serialize_project_tree(tree: &[Project]) -> serde_json::Result<String> {
    serde_json::to_string(tree)
}

/// Parses a stored project tree. An empty string is an empty tree.
pub fn parse_project_tree(raw: &str) -> serde_json::Result<Vec<Project>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NamedRef, PROJECT_STATUS_ACTIVE};

    fn project(id: u64, parent: Option<u64>, status: i32) -> Project {
        Project {
            id,
            name: format!("Project {id}"),
            identifier: format!("project-{id}"),
            parent: parent.map(|id| NamedRef {
                id,
                name: format!("Project {id}"),
            }),
            status,
            ..Default::default()
        }
    }

    fn ids(projects: &[Project]) -> Vec<u64> {
        projects.iter().map(|p| p.id).collect()
    }

    #[test]
    fn grandchildren_are_dropped() {
        let tree = build_project_tree(vec![
            project(1, None, PROJECT_STATUS_ACTIVE),
            project(2, Some(1), PROJECT_STATUS_ACTIVE),
            project(3, Some(2), PROJECT_STATUS_ACTIVE),
        ]);

        assert_eq!(ids(&tree), vec![1]);
        assert_eq!(ids(&tree[0].children), vec![2]);
        assert!(tree[0].children[0].children.is_empty());
        assert!(find_root_project(&tree, 3).is_none());
    }

    #[test]
    fn inactive_projects_are_filtered_out() {
        let tree = build_project_tree(vec![
            project(1, None, PROJECT_STATUS_ACTIVE),
            project(2, Some(1), 5),
            project(3, None, 9),
            project(4, Some(3), PROJECT_STATUS_ACTIVE),
            project(5, Some(1), PROJECT_STATUS_ACTIVE),
        ]);

        assert_eq!(ids(&tree), vec![1]);
        assert_eq!(ids(&tree[0].children), vec![5]);
    }

    #[test]
    fn input_order_is_preserved() {
        let tree = build_project_tree(vec![
            project(10, Some(7), PROJECT_STATUS_ACTIVE),
            project(7, None, PROJECT_STATUS_ACTIVE),
            project(3, None, PROJECT_STATUS_ACTIVE),
            project(8, Some(7), PROJECT_STATUS_ACTIVE),
        ]);

        assert_eq!(ids(&tree), vec![7, 3]);
        assert_eq!(ids(&tree[0].children), vec![10, 8]);
    }

    #[test]
    fn find_root_project_resolves_children_to_their_root() {
        let tree = build_project_tree(vec![
            project(1, None, PROJECT_STATUS_ACTIVE),
            project(2, Some(1), PROJECT_STATUS_ACTIVE),
        ]);

        assert_eq!(find_root_project(&tree, 2).map(|p| p.id), Some(1));
        assert_eq!(find_root_project(&tree, 1).map(|p| p.id), Some(1));
        assert!(find_root_project(&tree, 99).is_none());
    }

    #[test]
    fn tree_survives_storage() {
        let tree = build_project_tree(vec![
            project(1, None, PROJECT_STATUS_ACTIVE),
            project(2, Some(1), PROJECT_STATUS_ACTIVE),
        ]);

        let stored = serialize_project_tree(&tree).unwrap();
        assert_eq!(parse_project_tree(&stored).unwrap(), tree);
        assert!(parse_project_tree("").unwrap().is_empty());
    }
}
