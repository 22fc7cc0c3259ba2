//! Class layout: inheritance chain resolution, field flattening, and
//! virtual method table construction. Computed once per class, after the
//! whole class table has been registered (see `sema::program`); the chain
//! walk below is what actually rejects an inheritance cycle.

use crate::env::{ClassInfo, FunctionSig};
use crate::error::CompileError;
use crate::position::Position;
use crate::types::Type;
use std::collections::{HashMap, HashSet};

/// One slot in a class's vtable: the method name and the class that
/// currently provides its most-derived implementation.
#[derive(Clone, Debug, PartialEq)]
pub struct VtableSlot {
    pub method: String,
    pub defining_class: String,
}

/// The fully-resolved layout of a class, after flattening its ancestors.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassLayout {
    /// Root ancestor first, this class last.
    pub inheritance_chain: Vec<String>,
    /// The union of all ancestors' fields, in chain order. No duplicates.
    pub fields: Vec<(String, Type)>,
    /// Root-first, layer-concatenated; overriding replaces the slot in
    /// place rather than appending.
    pub vtable: Vec<VtableSlot>,
}

impl ClassLayout {
    /// 8 bytes for the vtable pointer, plus 8 bytes per field (every
    /// attribute slot is a full quadword regardless of declared width).
    pub fn size(&self) -> u32 {
        8 + 8 * self.fields.len() as u32
    }

    pub fn field_offset(&self, name: &str) -> Option<u32> {
        self.fields
            .iter()
            .position(|(n, _)| n == name)
            .map(|idx| 8 + 8 * idx as u32)
    }

    pub fn field_type(&self, name: &str) -> Option<&Type> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn method_offset(&self, name: &str) -> Option<u32> {
        self.vtable
            .iter()
            .position(|slot| slot.method == name)
            .map(|idx| 8 * idx as u32)
    }

    /// The class (possibly an ancestor) that defines the most-derived
    /// implementation of `name`, for emitting `cls_<class>_<name>` as the
    /// slot's initial value.
    pub fn defining_class_of(&self, name: &str) -> Option<&str> {
        self.vtable
            .iter()
            .find(|slot| slot.method == name)
            .map(|slot| slot.defining_class.as_str())
    }
}

/// Walk `class`'s parent chain, root-first. Returns an error if a cycle is
/// found (a class reachable from itself). This is the sole inheritance-cycle
/// check in the pipeline: `sema::program::build_class_table` accepts a
/// parent named anywhere in the program (declared before or after its
/// child), so only an actual revisit here is rejected.
fn resolve_chain(class: &str, cls: &HashMap<String, ClassInfo>) -> Result<Vec<String>, CompileError> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = class.to_string();
    loop {
        if !seen.insert(current.clone()) {
            return Err(CompileError::InheritanceCycle(current));
        }
        chain.push(current.clone());
        match cls.get(&current).and_then(|info| info.parent.clone()) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    chain.reverse();
    Ok(chain)
}

/// Build the flattened field list and vtable for `class`, given the whole
/// class table. `pos` is used only to attach a position to a
/// `DuplicateField` error (the class's own declaration site).
pub fn build_layout(
    class: &str,
    cls: &HashMap<String, ClassInfo>,
    pos: Position,
) -> Result<(ClassLayout, Position), CompileError> {
    let chain = resolve_chain(class, cls)?;

    let mut fields: Vec<(String, Type)> = Vec::new();
    let mut seen_fields = HashSet::new();
    let mut vtable: Vec<VtableSlot> = Vec::new();
    let mut slot_index: HashMap<String, usize> = HashMap::new();

    for layer in &chain {
        let info = cls.get(layer).expect("chain only names registered classes");

        for (name, ty) in &info.own_fields {
            if !seen_fields.insert(name.clone()) {
                return Err(CompileError::DuplicateField(name.clone()));
            }
            fields.push((name.clone(), ty.clone()));
        }

        let mut method_names: Vec<&String> = info.own_methods.keys().collect();
        method_names.sort();
        for method_name in method_names {
            if let Some(&idx) = slot_index.get(method_name) {
                let ancestor = vtable[idx].defining_class.clone();
                let ancestor_sig = cls
                    .get(&ancestor)
                    .and_then(|a| a.own_methods.get(method_name))
                    .expect("a slot's defining class always owns the signature it installed");
                let new_sig = &info.own_methods[method_name];
                if ancestor_sig.return_type != new_sig.return_type
                    || ancestor_sig.params != new_sig.params
                {
                    return Err(CompileError::OverrideSignatureMismatch {
                        name: method_name.clone(),
                        ancestor,
                    });
                }
                // Override: replace the defining class in the ancestor's slot.
                vtable[idx].defining_class = layer.clone();
            } else {
                slot_index.insert(method_name.clone(), vtable.len());
                vtable.push(VtableSlot {
                    method: method_name.clone(),
                    defining_class: layer.clone(),
                });
            }
        }
    }

    Ok((
        ClassLayout {
            inheritance_chain: chain,
            fields,
            vtable,
        },
        pos,
    ))
}

/// Resolve a method's signature by walking `class`'s (already-flattened)
/// ancestry for the nearest definition, matching the override rule that an
/// override must have an identical signature to what it replaces.
pub fn resolve_method<'a>(
    mut class: &str,
    method: &str,
    cls: &'a HashMap<String, ClassInfo>,
) -> Option<&'a FunctionSig> {
    loop {
        let info = cls.get(class)?;
        if let Some(sig) = info.own_methods.get(method) {
            return Some(sig);
        }
        class = info.parent.as_deref()?;
    }
}
