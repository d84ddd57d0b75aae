use std::any::Any;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Typed blackboard key.
///
/// Keys are declared from a static name (`BbKey::new("Global.IsInTransport")`); the numeric id
/// is an FNV-1a hash of that name computed at compile time, so the same name always maps to the
/// same slot regardless of declaration site.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    id: u64,
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            id: fnv1a(name.as_bytes()),
            name,
            _phantom: PhantomData,
        }
    }

    pub fn id(self) -> u64 {
        self.id
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

const fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        i += 1;
    }
    hash
}

/// Per-agent keyed state shared by the nodes of one tree instance.
///
/// Reading a key with a different type than it was written with is a programming error and
/// panics.
#[derive(Default)]
pub struct Blackboard {
    values: BTreeMap<u64, Box<dyn Any>>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains<T: 'static>(&self, key: BbKey<T>) -> bool {
        self.values.contains_key(&key.id)
    }

    pub fn set<T: 'static>(&mut self, key: BbKey<T>, value: T) {
        self.values.insert(key.id, Box::new(value));
    }

    pub fn get<T: 'static>(&self, key: BbKey<T>) -> Option<&T> {
        let value = self.values.get(&key.id)?;
        value.downcast_ref::<T>().or_else(|| mismatch(key.name))
    }

    pub fn get_mut<T: 'static>(&mut self, key: BbKey<T>) -> Option<&mut T> {
        let value = self.values.get_mut(&key.id)?;
        value.downcast_mut::<T>().or_else(|| mismatch(key.name))
    }

    pub fn remove<T: 'static>(&mut self, key: BbKey<T>) -> Option<T> {
        let value = self.values.remove(&key.id)?;
        value.downcast::<T>().map(|b| *b).ok().or_else(|| mismatch(key.name))
    }

    /// Value stored under `key`, or `T::default()` when absent.
    pub fn value_or_default<T: Copy + Default + 'static>(&self, key: BbKey<T>) -> T {
        self.get(key).copied().unwrap_or_default()
    }

    /// Whether the stored value differs from its type's default. Absent keys are unset.
    pub fn is_set<T: Default + PartialEq + 'static>(&self, key: BbKey<T>) -> bool {
        self.get(key).is_some_and(|v| *v != T::default())
    }
}

fn mismatch<R>(name: &str) -> Option<R> {
    panic!("blackboard type mismatch for key `{name}` (stored type differs from requested)")
}
