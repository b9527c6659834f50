use super::{expect_label, put_string, string_property, MappingError, NodeEntity};
use crate::graph::{Node, NodeId, PropertyMap};

/// A person node: identity plus two optional names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    pub id: Option<NodeId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Person {
    pub const FIRST_NAME: &'static str = "firstName";
    pub const LAST_NAME: &'static str = "lastName";

    /// Unsaved person with both names set
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: None,
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
        }
    }
}

impl NodeEntity for Person {
    const LABEL: &'static str = "Person";
    const PROPERTIES: &'static [&'static str] = &[Self::FIRST_NAME, Self::LAST_NAME];

    fn id(&self) -> Option<NodeId> {
        self.id
    }

    fn to_properties(&self) -> PropertyMap {
        let mut properties = PropertyMap::new();
        put_string(&mut properties, Self::FIRST_NAME, &self.first_name);
        put_string(&mut properties, Self::LAST_NAME, &self.last_name);
        properties
    }

    fn from_node(node: &Node) -> Result<Self, MappingError> {
        expect_label::<Self>(node)?;

        Ok(Person {
            id: Some(node.id),
            first_name: string_property(node, Self::FIRST_NAME)?,
            last_name: string_property(node, Self::LAST_NAME)?,
        })
    }
}
