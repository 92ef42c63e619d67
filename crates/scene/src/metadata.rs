use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::HostError;
use crate::fixed_string::FixedString;

/// Character slots reserved for one string member.
pub const TEXT_SLOT_LENGTH: usize = 400;

pub type MetadataString = FixedString<TEXT_SLOT_LENGTH>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Boolean,
    Double,
    Int32,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub data_type: DataType,
    pub length: usize,
}

/// Named record layout. Member lengths count scalar slots, or whole
/// fixed-capacity strings for `DataType::Text`.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    name: String,
    members: Vec<Member>,
}

impl Structure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Returns `false` when a member of that name already exists.
    pub fn add_member(&mut self, data_type: DataType, length: usize, name: &str) -> bool {
        if self.member_index(name).is_some() {
            return false;
        }
        self.members.push(Member {
            name: name.to_string(),
            data_type,
            length,
        });
        true
    }

    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|member| member.name == name)
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.member_index(name).map(|index| &self.members[index])
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Slots {
    Boolean(Vec<bool>),
    Double(Vec<f64>),
    Int32(Vec<i32>),
    Text(Vec<MetadataString>),
}

impl Slots {
    fn zeroed(member: &Member) -> Self {
        match member.data_type {
            DataType::Boolean => Slots::Boolean(vec![false; member.length]),
            DataType::Double => Slots::Double(vec![0.0; member.length]),
            DataType::Int32 => Slots::Int32(vec![0; member.length]),
            DataType::Text => Slots::Text(vec![MetadataString::new(); member.length]),
        }
    }
}

/// One record of a structure, addressed member by member after positioning.
#[derive(Debug, Clone, PartialEq)]
pub struct Handle {
    structure: Arc<Structure>,
    slots: Vec<Slots>,
    position: Option<usize>,
}

impl Handle {
    pub fn new(structure: Arc<Structure>) -> Self {
        let slots = structure.members().iter().map(Slots::zeroed).collect();
        Self {
            structure,
            slots,
            position: None,
        }
    }

    pub fn structure(&self) -> &Arc<Structure> {
        &self.structure
    }

    /// Moves the handle onto `name`. On an unknown member the handle is left
    /// unpositioned and every typed accessor yields `None`.
    pub fn set_position_by_member_name(&mut self, name: &str) -> bool {
        self.position = self.structure.member_index(name);
        self.position.is_some()
    }

    pub fn data_type(&self) -> Option<DataType> {
        self.position
            .map(|index| self.structure.members()[index].data_type)
    }

    pub fn data_length(&self) -> usize {
        self.position
            .map(|index| self.structure.members()[index].length)
            .unwrap_or(0)
    }

    fn current(&self) -> Option<&Slots> {
        self.position.map(|index| &self.slots[index])
    }

    fn current_mut(&mut self) -> Option<&mut Slots> {
        self.position.map(|index| &mut self.slots[index])
    }

    pub fn as_boolean(&self) -> Option<&[bool]> {
        match self.current()? {
            Slots::Boolean(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_boolean_mut(&mut self) -> Option<&mut [bool]> {
        match self.current_mut()? {
            Slots::Boolean(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<&[f64]> {
        match self.current()? {
            Slots::Double(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_double_mut(&mut self) -> Option<&mut [f64]> {
        match self.current_mut()? {
            Slots::Double(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_int32(&self) -> Option<&[i32]> {
        match self.current()? {
            Slots::Int32(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_int32_mut(&mut self) -> Option<&mut [i32]> {
        match self.current_mut()? {
            Slots::Int32(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&[MetadataString]> {
        match self.current()? {
            Slots::Text(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut [MetadataString]> {
        match self.current_mut()? {
            Slots::Text(values) => Some(values),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataStream {
    name: String,
    structure: Arc<Structure>,
    elements: BTreeMap<usize, Handle>,
}

impl DataStream {
    pub fn new(structure: Arc<Structure>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            structure,
            elements: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn structure(&self) -> &Arc<Structure> {
        &self.structure
    }

    pub fn set_element(&mut self, index: usize, handle: Handle) -> Result<(), HostError> {
        if handle.structure().name() != self.structure.name() {
            return Err(HostError::StructureMismatch {
                handle: handle.structure().name().to_string(),
                stream: self.structure.name().to_string(),
            });
        }
        self.elements.insert(index, handle);
        Ok(())
    }

    pub fn element(&self, index: usize) -> Option<&Handle> {
        self.elements.get(&index)
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn elements(&self) -> impl Iterator<Item = (usize, &Handle)> {
        self.elements.iter().map(|(index, handle)| (*index, handle))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    name: String,
    streams: BTreeMap<String, DataStream>,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            streams: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_data_stream(&mut self, stream: DataStream) {
        self.streams.insert(stream.name().to_string(), stream);
    }

    pub fn data_stream(&self, name: &str) -> Option<&DataStream> {
        self.streams.get(name)
    }

    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }
}

/// Per-mesh metadata. Clones share storage until one side is made unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Associations {
    channels: Arc<BTreeMap<String, Channel>>,
}

impl Associations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn make_unique(&mut self) {
        Arc::make_mut(&mut self.channels);
    }

    pub fn shares_storage_with(&self, other: &Associations) -> bool {
        Arc::ptr_eq(&self.channels, &other.channels)
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn set_channel(&mut self, channel: Channel) {
        Arc::make_mut(&mut self.channels).insert(channel.name().to_string(), channel);
    }

    pub fn remove_channel(&mut self, name: &str) -> Option<Channel> {
        if !self.channels.contains_key(name) {
            return None;
        }
        Arc::make_mut(&mut self.channels).remove(name)
    }
}

/// Process-wide structure table keyed by structure name.
#[derive(Debug, Default)]
pub struct StructureRegistry {
    structures: HashMap<String, Arc<Structure>>,
}

impl StructureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn structure_by_name(&self, name: &str) -> Option<Arc<Structure>> {
        self.structures.get(name).cloned()
    }

    pub fn register(&mut self, structure: Structure) -> Result<Arc<Structure>, HostError> {
        if self.structures.contains_key(structure.name()) {
            return Err(HostError::StructureExists(structure.name().to_string()));
        }
        let structure = Arc::new(structure);
        self.structures
            .insert(structure.name().to_string(), Arc::clone(&structure));
        Ok(structure)
    }

    pub fn deregister(&mut self, name: &str) -> Option<Arc<Structure>> {
        self.structures.remove(name)
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Structure {
        let mut structure = Structure::new("record");
        structure.add_member(DataType::Int32, 1, "start");
        structure.add_member(DataType::Double, 5, "color");
        structure.add_member(DataType::Text, 1, "texture");
        structure
    }

    #[test]
    fn duplicate_members_are_rejected() {
        let mut structure = layout();
        assert!(!structure.add_member(DataType::Boolean, 1, "start"));
        assert_eq!(structure.members().len(), 3);
    }

    #[test]
    fn handle_positions_by_name() {
        let mut handle = Handle::new(Arc::new(layout()));
        assert!(handle.set_position_by_member_name("color"));
        assert_eq!(handle.data_type(), Some(DataType::Double));
        assert_eq!(handle.data_length(), 5);
        handle.as_double_mut().unwrap()[1] = 0.5;
        assert!(handle.as_int32().is_none());
        assert_eq!(handle.as_double().unwrap(), &[0.0, 0.5, 0.0, 0.0, 0.0]);

        assert!(!handle.set_position_by_member_name("missing"));
        assert_eq!(handle.data_type(), None);
        assert!(handle.as_double().is_none());
    }

    #[test]
    fn stream_rejects_foreign_handles() {
        let structure = Arc::new(layout());
        let mut stream = DataStream::new(Arc::clone(&structure), "stream");
        stream.set_element(0, Handle::new(structure)).unwrap();
        let other = Arc::new(Structure::new("other"));
        assert!(stream.set_element(1, Handle::new(other)).is_err());
        assert_eq!(stream.element_count(), 1);
    }

    #[test]
    fn associations_copy_on_write() {
        let mut original = Associations::new();
        original.set_channel(Channel::new("a"));
        let mut copy = original.clone();
        assert!(copy.shares_storage_with(&original));
        copy.make_unique();
        copy.set_channel(Channel::new("b"));
        assert!(!copy.shares_storage_with(&original));
        assert!(original.channel("b").is_none());
        assert!(copy.channel("a").is_some());
    }

    #[test]
    fn registry_requires_deregistration() {
        let mut registry = StructureRegistry::new();
        registry.register(layout()).unwrap();
        assert!(matches!(
            registry.register(layout()),
            Err(HostError::StructureExists(_))
        ));
        assert!(registry.deregister("record").is_some());
        registry.register(Structure::new("record")).unwrap();
        assert_eq!(registry.len(), 1);
    }
}
