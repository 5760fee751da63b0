mod attribute;
mod object_class;
mod object_instance;
mod oo_state;

pub use attribute::{Attribute, AttributeType, Value};
pub use object_class::ObjectClass;
pub use object_instance::ObjectInstance;
pub use oo_state::OOState;
