use dropbot_core::{BbKey, Blackboard, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl CompareOp {
    /// `lhs <op> rhs`, where `lhs` is the blackboard value.
    pub fn apply(self, lhs: i32, rhs: i32) -> bool {
        match self {
            CompareOp::Equal => lhs == rhs,
            CompareOp::NotEqual => lhs != rhs,
            CompareOp::Less => lhs < rhs,
            CompareOp::LessOrEqual => lhs <= rhs,
            CompareOp::Greater => lhs > rhs,
            CompareOp::GreaterOrEqual => lhs >= rhs,
        }
    }
}

/// Blackboard slot an [`Decorator::IsSet`] guard can inspect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetKey {
    Bool(BbKey<bool>),
    Int(BbKey<i32>),
    Point(BbKey<Vec3>),
}

impl SetKey {
    fn is_set(self, blackboard: &Blackboard) -> bool {
        match self {
            SetKey::Bool(key) => blackboard.is_set(key),
            SetKey::Int(key) => blackboard.is_set(key),
            SetKey::Point(key) => blackboard.is_set(key),
        }
    }
}

impl From<BbKey<bool>> for SetKey {
    fn from(key: BbKey<bool>) -> Self {
        SetKey::Bool(key)
    }
}

impl From<BbKey<i32>> for SetKey {
    fn from(key: BbKey<i32>) -> Self {
        SetKey::Int(key)
    }
}

impl From<BbKey<Vec3>> for SetKey {
    fn from(key: BbKey<Vec3>) -> Self {
        SetKey::Point(key)
    }
}

/// Pure guard evaluated before a node's body.
///
/// Decorators only read the blackboard. Missing keys read as the type's default, so an
/// `EnumCompare` against an absent key compares `0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decorator {
    EnumCompare {
        key: BbKey<i32>,
        value: i32,
        op: CompareOp,
    },
    IsSet(SetKey),
}

impl Decorator {
    pub fn enum_compare(key: BbKey<i32>, op: CompareOp, value: impl Into<i32>) -> Self {
        Decorator::EnumCompare {
            key,
            value: value.into(),
            op,
        }
    }

    pub fn enum_equals(key: BbKey<i32>, value: impl Into<i32>) -> Self {
        Self::enum_compare(key, CompareOp::Equal, value)
    }

    pub fn is_set(key: impl Into<SetKey>) -> Self {
        Decorator::IsSet(key.into())
    }

    pub fn evaluate(&self, blackboard: &Blackboard) -> bool {
        match *self {
            Decorator::EnumCompare { key, value, op } => {
                op.apply(blackboard.value_or_default(key), value)
            }
            Decorator::IsSet(key) => key.is_set(blackboard),
        }
    }
}
