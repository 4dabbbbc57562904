//! Mixin registry
//!
//! [`MixinData`] snapshots the mixin instances of a generation request.
//! Every instance contributes the interfaces its type implements; those
//! interfaces are kept sorted by name so the order in which mixins were
//! supplied never changes equality, hashing or the generated layout.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use interpose_types::{TypeDescriptor, TypeRef};
use rustc_hash::FxHashMap;

use crate::error::ConfigurationError;
use crate::proxy::target::ProxyTarget;
use crate::proxy::util::PROXY_TARGET_ACCESSOR_NAME;

/// Instance-free shape of a mixin set, kept on the generated proxy type
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MixinLayout {
    /// Mixin interfaces sorted by name
    pub interfaces: Vec<TypeRef>,
    /// For each interface, the slot of the instance serving it
    pub slots: Vec<usize>,
}

impl MixinLayout {
    /// Number of interfaces
    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    /// Check for no mixins
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Number of distinct instances
    pub fn instance_count(&self) -> usize {
        self.slots.iter().max().map_or(0, |max| max + 1)
    }

    fn describe(&self) -> String {
        self.interfaces
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Snapshot of the mixins supplied with a generation request
#[derive(Clone, Default)]
pub struct MixinData {
    layout: MixinLayout,
    interfaces: Vec<Arc<TypeDescriptor>>,
    instances: Vec<Arc<dyn ProxyTarget>>,
}

impl MixinData {
    /// Build from mixin instances.
    ///
    /// Instances exposing no interface are dropped. Fails when two mixins
    /// expose the same interface or a mixin is itself a proxy.
    pub fn new(mixins: &[Arc<dyn ProxyTarget>]) -> Result<Self, ConfigurationError> {
        // interface -> (descriptor, index into `mixins`)
        let mut owners: FxHashMap<TypeRef, (Arc<TypeDescriptor>, usize)> = FxHashMap::default();

        for (index, mixin) in mixins.iter().enumerate() {
            let ty = mixin.type_descriptor();
            for iface in ty.all_interfaces() {
                if iface.name == PROXY_TARGET_ACCESSOR_NAME {
                    return Err(ConfigurationError::InfrastructureInterfaceMixin {
                        mixin: ty.to_string(),
                        interface: iface.to_string(),
                    });
                }
                let key = iface.type_ref();
                if let Some((_, first)) = owners.get(&key) {
                    return Err(ConfigurationError::DuplicateMixinInterface {
                        interface: iface.to_string(),
                        first: mixins[*first].type_descriptor().to_string(),
                        second: ty.to_string(),
                    });
                }
                owners.insert(key, (iface, index));
            }
        }

        let mut sorted: Vec<(TypeRef, Arc<TypeDescriptor>, usize)> = owners
            .into_iter()
            .map(|(key, (iface, index))| (key, iface, index))
            .collect();
        // display text alone can tie (same name, different visibility)
        sorted.sort_by_cached_key(|(key, _, _)| (key.to_string(), key.clone()));

        // slots are assigned in order of each instance's first sorted interface
        let mut slot_for_index: FxHashMap<usize, usize> = FxHashMap::default();
        let mut instances = Vec::new();
        let mut slots = Vec::with_capacity(sorted.len());
        for (_, _, index) in &sorted {
            let slot = *slot_for_index.entry(*index).or_insert_with(|| {
                instances.push(Arc::clone(&mixins[*index]));
                instances.len() - 1
            });
            slots.push(slot);
        }

        let (interface_refs, interfaces): (Vec<_>, Vec<_>) =
            sorted.into_iter().map(|(key, iface, _)| (key, iface)).unzip();

        Ok(Self {
            layout: MixinLayout {
                interfaces: interface_refs,
                slots,
            },
            interfaces,
            instances,
        })
    }

    /// Empty mixin set
    pub fn empty() -> Self {
        Self::default()
    }

    /// Instance-free layout
    pub fn layout(&self) -> &MixinLayout {
        &self.layout
    }

    /// Check for no mixins
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Mixin interfaces, sorted by name
    pub fn mixin_interfaces(&self) -> &[Arc<TypeDescriptor>] {
        &self.interfaces
    }

    /// Distinct mixin instances, one per slot
    pub fn mixins(&self) -> &[Arc<dyn ProxyTarget>] {
        &self.instances
    }

    /// Check whether some mixin serves `iface`
    pub fn contains_mixin(&self, iface: &TypeRef) -> bool {
        self.interface_position(iface).is_some()
    }

    /// Index of `iface` in the sorted interface list
    pub fn interface_position(&self, iface: &TypeRef) -> Option<usize> {
        self.layout.interfaces.iter().position(|i| i == iface)
    }

    /// Slot of the instance serving `iface`; all interfaces of one mixin
    /// share a slot
    pub fn mixin_position(&self, iface: &TypeRef) -> Option<usize> {
        self.interface_position(iface).map(|pos| self.layout.slots[pos])
    }

    /// Instance serving `iface`
    pub fn mixin_for(&self, iface: &TypeRef) -> Option<&Arc<dyn ProxyTarget>> {
        self.mixin_position(iface).map(|slot| &self.instances[slot])
    }
}

impl PartialEq for MixinData {
    fn eq(&self, other: &Self) -> bool {
        self.layout.interfaces == other.layout.interfaces
    }
}

impl Eq for MixinData {}

impl Hash for MixinData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.layout.interfaces.hash(state);
    }
}

impl fmt::Debug for MixinData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixinData")
            .field("interfaces", &self.layout.describe())
            .field("instances", &self.instances.len())
            .finish()
    }
}

/// Check that instance mixins fit the layout a proxy type was built for.
///
/// Only the interface lists must agree; slot assignment is per instance.
pub(crate) fn check_layout(
    proxy: &str,
    expected: &MixinLayout,
    actual: &MixinData,
) -> Result<(), ConfigurationError> {
    if expected.interfaces == actual.layout.interfaces {
        return Ok(());
    }
    Err(ConfigurationError::MixinLayoutMismatch {
        proxy: proxy.to_string(),
        expected: expected.describe(),
        actual: actual.layout.describe(),
    })
}
