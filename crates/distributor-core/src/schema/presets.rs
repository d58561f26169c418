//! Schema trees the distributor ships with

use super::node::SchemaNode;

/// Layout of `mod_warehouse`.
pub fn warehouse() -> SchemaNode {
    SchemaNode::directory("mod_warehouse")
        .with_child(
            SchemaNode::directory("mods")
                .with_child(SchemaNode::directory("server"))
                .with_child(SchemaNode::directory("client")),
        )
        .with_child(
            SchemaNode::directory("archives")
                .with_child(SchemaNode::directory("essentials"))
                .with_child(SchemaNode::directory("client")),
        )
}

/// `distribution-config.toml` with an `[FTP]` table of connection settings.
pub fn ftp_config() -> SchemaNode {
    SchemaNode::key("distribution-config").with_child(SchemaNode::key("FTP").with_children([
        SchemaNode::key("host"),
        SchemaNode::key("user"),
        SchemaNode::key("password"),
        SchemaNode::key("port"),
    ]))
}

/// Older flat layout tracking published mod-pack versions.
pub fn legacy_versions_config() -> SchemaNode {
    SchemaNode::key("distribution-config").with_children([
        SchemaNode::key("server-mods-version"),
        SchemaNode::key("client-mods-version"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaPath;

    #[test]
    fn shipped_schemas_are_valid() {
        warehouse().validate().unwrap();
        ftp_config().validate().unwrap();
        legacy_versions_config().validate().unwrap();
    }

    #[test]
    fn warehouse_leaves() {
        let leaves: Vec<String> = warehouse()
            .leaf_paths(&SchemaPath::root())
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            leaves,
            vec![
                "mods/server",
                "mods/client",
                "archives/essentials",
                "archives/client"
            ]
        );
    }
}
