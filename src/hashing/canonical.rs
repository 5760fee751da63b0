use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::error::{PlanningError, Result};
use crate::state::{AttributeType, OOState, ObjectInstance, Value};

/// Canonical, order-comparable image of one attribute value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Key {
    Int(i64),
    Bits(u64),
    Text(String),
    Names(Vec<String>),
    Ints(Vec<i64>),
    BitsArray(Vec<u64>),
}

/// Per-instance value signature, one key per declared attribute.
pub(crate) type Signature = Vec<Key>;

/// Floors continuous values to a multiple before they are hashed or compared.
#[derive(Debug, Clone, Default)]
pub struct Discretization {
    default_multiple: Option<f64>,
    per_attribute: HashMap<String, f64>,
}

impl Discretization {
    /// Every real attribute is floored to `multiple`.
    pub fn uniform(multiple: f64) -> Result<Self> {
        check_multiple(multiple)?;
        Ok(Self {
            default_multiple: Some(multiple),
            per_attribute: HashMap::new(),
        })
    }

    /// Overrides (or introduces) the multiple used for one attribute name. Discrete
    /// attributes are only floored when they have an override.
    pub fn with_attribute(mut self, attribute: impl Into<String>, multiple: f64) -> Result<Self> {
        check_multiple(multiple)?;
        self.per_attribute.insert(attribute.into(), multiple);
        Ok(self)
    }

    fn multiple_for(&self, attribute: &str, kind: AttributeType) -> Option<f64> {
        if let Some(m) = self.per_attribute.get(attribute) {
            return Some(*m);
        }
        match kind {
            AttributeType::Real | AttributeType::RealArray => self.default_multiple,
            _ => None,
        }
    }
}

fn check_multiple(multiple: f64) -> Result<()> {
    if multiple.is_finite() && multiple > 0.0 {
        Ok(())
    } else {
        Err(PlanningError::InvalidParameter(format!(
            "discretization multiple must be positive and finite, got {}",
            multiple
        )))
    }
}

fn real_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

fn bucket(v: f64, multiple: f64) -> i64 {
    (v / multiple).floor() as i64
}

/// Builds the signature of one object instance under the given mode.
pub(crate) fn signature(
    object: &ObjectInstance,
    identifier_independent: bool,
    discretization: Option<&Discretization>,
) -> Result<Signature> {
    let class = object.class();
    let mut keys = Vec::with_capacity(object.values().len());
    for (attribute, value) in class.attributes().iter().zip(object.values()) {
        if identifier_independent && attribute.kind.is_relational() {
            return Err(PlanningError::UnsupportedAttribute {
                class: class.name.clone(),
                attribute: attribute.name.clone(),
                reason: "object references need identifier-dependent hashing",
            });
        }
        let multiple = discretization.and_then(|d| d.multiple_for(&attribute.name, attribute.kind));
        let key = match value {
            Value::Discrete(v) => match multiple {
                Some(m) => Key::Int(bucket(*v as f64, m)),
                None => Key::Int(*v),
            },
            Value::Real(v) => match multiple {
                Some(m) => Key::Int(bucket(*v, m)),
                None => Key::Bits(real_bits(*v)),
            },
            Value::Str(s) => Key::Text(s.clone()),
            Value::Relational(target) => Key::Names(target.iter().cloned().collect()),
            Value::MultiRelational(targets) => Key::Names(targets.iter().cloned().collect()),
            Value::IntArray(vs) => Key::Ints(vs.clone()),
            Value::RealArray(vs) => match multiple {
                Some(m) => Key::Ints(vs.iter().map(|v| bucket(*v, m)).collect()),
                None => Key::BitsArray(vs.iter().map(|v| real_bits(*v)).collect()),
            },
        };
        keys.push(key);
    }
    Ok(keys)
}

#[derive(Debug)]
pub(crate) struct NamedEntry {
    name: String,
    class: String,
    signature: Signature,
}

/// Instances of one class, sorted by (signature, name).
#[derive(Debug)]
pub(crate) struct ClassGroup {
    class: String,
    members: Vec<(Signature, String)>,
}

#[derive(Debug)]
pub(crate) enum CanonicalForm {
    Named(Vec<NamedEntry>),
    Unnamed(Vec<ClassGroup>),
}

impl CanonicalForm {
    pub(crate) fn build(
        state: &OOState,
        identifier_independent: bool,
        discretization: Option<&Discretization>,
    ) -> Result<Self> {
        if !identifier_independent {
            let entries = state
                .objects()
                .map(|o| {
                    Ok(NamedEntry {
                        name: o.name().to_string(),
                        class: o.class_name().to_string(),
                        signature: signature(o, false, discretization)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(CanonicalForm::Named(entries));
        }

        let mut by_class: HashMap<&str, Vec<(Signature, String)>> = HashMap::new();
        for object in state.objects() {
            let sig = signature(object, true, discretization)?;
            by_class
                .entry(object.class_name())
                .or_default()
                .push((sig, object.name().to_string()));
        }
        let mut groups: Vec<ClassGroup> = by_class
            .into_iter()
            .map(|(class, mut members)| {
                members.sort();
                ClassGroup {
                    class: class.to_string(),
                    members,
                }
            })
            .collect();
        groups.sort_by(|a, b| a.class.cmp(&b.class));
        Ok(CanonicalForm::Unnamed(groups))
    }

    /// Folds the canonical form into a hash code in (class, sorted signature) order.
    pub(crate) fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        match self {
            CanonicalForm::Named(entries) => {
                for entry in entries {
                    entry.name.hash(&mut hasher);
                    entry.class.hash(&mut hasher);
                    entry.signature.hash(&mut hasher);
                }
            }
            CanonicalForm::Unnamed(groups) => {
                for group in groups {
                    group.class.hash(&mut hasher);
                    group.members.len().hash(&mut hasher);
                    for (sig, _) in &group.members {
                        sig.hash(&mut hasher);
                    }
                }
            }
        }
        hasher.finish()
    }

    pub(crate) fn equivalent(&self, other: &CanonicalForm) -> bool {
        match (self, other) {
            (CanonicalForm::Named(a), CanonicalForm::Named(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| {
                        x.name == y.name && x.class == y.class && x.signature == y.signature
                    })
            }
            (CanonicalForm::Unnamed(a), CanonicalForm::Unnamed(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| {
                        x.class == y.class
                            && x.members.len() == y.members.len()
                            && x.members
                                .iter()
                                .zip(&y.members)
                                .all(|((sx, _), (sy, _))| sx == sy)
                    })
            }
            _ => false,
        }
    }

    /// Name bijection from `self` to `other`, pairing instances with equal signatures.
    /// Only meaningful when the two forms are equivalent.
    pub(crate) fn matching(&self, other: &CanonicalForm) -> HashMap<String, String> {
        match (self, other) {
            (CanonicalForm::Unnamed(a), CanonicalForm::Unnamed(b)) => a
                .iter()
                .zip(b)
                .flat_map(|(x, y)| {
                    x.members
                        .iter()
                        .zip(&y.members)
                        .map(|((_, nx), (_, ny))| (nx.clone(), ny.clone()))
                })
                .collect(),
            (CanonicalForm::Named(a), _) => a
                .iter()
                .map(|e| (e.name.clone(), e.name.clone()))
                .collect(),
            (CanonicalForm::Unnamed(a), CanonicalForm::Named(_)) => a
                .iter()
                .flat_map(|g| g.members.iter().map(|(_, n)| (n.clone(), n.clone())))
                .collect(),
        }
    }
}
