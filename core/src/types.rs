//! The type registry: the set of types a value or declaration can carry,
//! their sizes, and the subtype/cast relations over them.

use std::fmt::{self, Display, Formatter};

/// A semantic type. Structural equality on the discriminant, per the data
/// model: two class types are equal iff they name the same class.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Type {
    Int,
    Bool,
    String,
    /// Never the type of a variable, parameter, or value expression.
    Void,
    /// Never a declared type; only ever inferred for the `null` literal.
    Null,
    Class(String),
}

impl Type {
    /// Size in bytes of a value of this type, for stack slots and object
    /// attribute slots. `void` has no representable value and `get_size`
    /// should never be called on it.
    pub fn get_size(&self) -> u32 {
        match self {
            Type::Int | Type::Bool => 4,
            Type::String | Type::Null | Type::Class(_) => 8,
            Type::Void => {
                unreachable!("void has no size; callers must reject it earlier")
            }
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Type::Class(_))
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class(name) => Some(name),
            _ => None,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "boolean"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Null => write!(f, "null"),
            Type::Class(name) => write!(f, "{}", name),
        }
    }
}

/// Anything that can answer "does class `name` have parent class `name`?".
/// `Environment` implements this; kept as a trait so the subtype/cast rules
/// below don't need to know about scopes, functions, or anything else in
/// the environment.
pub trait ClassHierarchy {
    /// The immediate parent of a class, if any. `None` for an unknown class
    /// name is a bug in the caller (classes are registered before any type
    /// checking runs); this trait does not itself validate existence.
    fn parent_of(&self, class: &str) -> Option<String>;
}

/// `is_subtype(sub, sup)`: does a value of type `sub` satisfy a context
/// requiring type `sup`?
///
/// - `sub == sup`
/// - `sub == Null` and `sup` is a class
/// - both are classes, and walking `sub`'s parent chain reaches `sup`
pub fn is_subtype(sub: &Type, sup: &Type, hierarchy: &dyn ClassHierarchy) -> bool {
    if sub == sup {
        return true;
    }
    match (sub, sup) {
        (Type::Null, Type::Class(_)) => true,
        (Type::Class(sub_name), Type::Class(sup_name)) => {
            let mut current = sub_name.clone();
            while let Some(parent) = hierarchy.parent_of(&current) {
                if parent == *sup_name {
                    return true;
                }
                current = parent;
            }
            false
        }
        _ => false,
    }
}

/// `can_cast(from, to)`: is an explicit cast from `from` to `to` legal?
/// Holds for downcasts (`is_subtype(to, from)`) and for `null`-to-class.
/// Casts are a purely static notion here: no runtime check backs them up.
pub fn can_cast(from: &Type, to: &Type, hierarchy: &dyn ClassHierarchy) -> bool {
    is_subtype(to, from, hierarchy) || (*from == Type::Null && to.is_class())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeHierarchy(HashMap<&'static str, &'static str>);

    impl ClassHierarchy for FakeHierarchy {
        fn parent_of(&self, class: &str) -> Option<String> {
            self.0.get(class).map(|s| s.to_string())
        }
    }

    fn chain() -> FakeHierarchy {
        // C extends B extends A
        let mut m = HashMap::new();
        m.insert("B", "A");
        m.insert("C", "B");
        FakeHierarchy(m)
    }

    #[test]
    fn reflexive() {
        let h = chain();
        assert!(is_subtype(&Type::Int, &Type::Int, &h));
        assert!(is_subtype(
            &Type::Class("A".into()),
            &Type::Class("A".into()),
            &h
        ));
    }

    #[test]
    fn null_is_subtype_of_every_class() {
        let h = chain();
        assert!(is_subtype(&Type::Null, &Type::Class("A".into()), &h));
        assert!(!is_subtype(&Type::Null, &Type::Int, &h));
    }

    #[test]
    fn transitive_up_the_chain() {
        let h = chain();
        assert!(is_subtype(
            &Type::Class("C".into()),
            &Type::Class("A".into()),
            &h
        ));
        assert!(!is_subtype(
            &Type::Class("A".into()),
            &Type::Class("C".into()),
            &h
        ));
    }

    #[test]
    fn unrelated_classes_are_not_subtypes() {
        let mut m = HashMap::new();
        m.insert("X", "Root");
        m.insert("Y", "Root");
        let h = FakeHierarchy(m);
        assert!(!is_subtype(
            &Type::Class("X".into()),
            &Type::Class("Y".into()),
            &h
        ));
    }

    #[test]
    fn can_cast_allows_downcast_and_null() {
        let h = chain();
        // downcast: A -> C is legal because C is a subtype of A
        assert!(can_cast(&Type::Class("A".into()), &Type::Class("C".into()), &h));
        // the reverse (upcast, C -> A) is not a "cast" in this language: it's
        // already a legal assignment via plain subtyping, and can_cast's
        // formula (is_subtype(to, from)) does not cover that direction
        assert!(!can_cast(&Type::Class("C".into()), &Type::Class("A".into()), &h));
        assert!(can_cast(&Type::Null, &Type::Class("A".into()), &h));
        assert!(!can_cast(&Type::Null, &Type::Int, &h));
    }

    #[test]
    fn can_cast_rejects_unrelated_classes() {
        let mut m = HashMap::new();
        m.insert("X", "Root");
        m.insert("Y", "Root");
        let h = FakeHierarchy(m);
        assert!(!can_cast(&Type::Class("X".into()), &Type::Class("Y".into()), &h));
    }
}
