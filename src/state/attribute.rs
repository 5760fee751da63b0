use std::collections::BTreeSet;

/// Declared type of an object attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Discrete,
    Real,
    String,
    /// Reference to at most one other object, by name
    Relational,
    /// Set of references to other objects, by name
    MultiRelational,
    IntArray,
    RealArray,
}

impl AttributeType {
    pub fn label(&self) -> &'static str {
        match self {
            AttributeType::Discrete => "discrete",
            AttributeType::Real => "real",
            AttributeType::String => "string",
            AttributeType::Relational => "relational",
            AttributeType::MultiRelational => "multi-relational",
            AttributeType::IntArray => "int array",
            AttributeType::RealArray => "real array",
        }
    }

    /// Value a freshly created instance holds for this attribute.
    pub fn default_value(&self) -> Value {
        match self {
            AttributeType::Discrete => Value::Discrete(0),
            AttributeType::Real => Value::Real(0.0),
            AttributeType::String => Value::Str(String::new()),
            AttributeType::Relational => Value::Relational(None),
            AttributeType::MultiRelational => Value::MultiRelational(BTreeSet::new()),
            AttributeType::IntArray => Value::IntArray(Vec::new()),
            AttributeType::RealArray => Value::RealArray(Vec::new()),
        }
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            AttributeType::Relational | AttributeType::MultiRelational
        )
    }
}

/// A named, typed slot in an object class schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeType,
}

impl Attribute {
    pub fn new(name: impl Into<String>, kind: AttributeType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Discrete(i64),
    Real(f64),
    Str(String),
    Relational(Option<String>),
    MultiRelational(BTreeSet<String>),
    IntArray(Vec<i64>),
    RealArray(Vec<f64>),
}

impl Value {
    pub fn kind(&self) -> AttributeType {
        match self {
            Value::Discrete(_) => AttributeType::Discrete,
            Value::Real(_) => AttributeType::Real,
            Value::Str(_) => AttributeType::String,
            Value::Relational(_) => AttributeType::Relational,
            Value::MultiRelational(_) => AttributeType::MultiRelational,
            Value::IntArray(_) => AttributeType::IntArray,
            Value::RealArray(_) => AttributeType::RealArray,
        }
    }

    pub fn as_discrete(&self) -> Option<i64> {
        match self {
            Value::Discrete(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Discrete(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Rewrites object references through `rename`, leaving other values untouched.
    pub(crate) fn rename_references(&mut self, rename: impl Fn(&str) -> Option<String>) {
        match self {
            Value::Relational(Some(target)) => {
                if let Some(renamed) = rename(target) {
                    *target = renamed;
                }
            }
            Value::MultiRelational(targets) => {
                *targets = targets
                    .iter()
                    .map(|t| rename(t).unwrap_or_else(|| t.clone()))
                    .collect();
            }
            _ => {}
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Discrete(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Discrete(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}
