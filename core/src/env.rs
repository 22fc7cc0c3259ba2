//! The lexically-scoped environment threaded through semantic analysis.
//!
//! The function/class tables are populated once, at the start of program
//! checking, and are immutable from then on — so they are held behind an
//! `Rc` and shared, not cloned, every time a nested scope is entered. The
//! variable table is a stack of scope frames that really is pushed and
//! popped around each block, which is the practical equivalent of the
//! original "deep-copy the whole environment on scope entry" approach
//! without repeatedly cloning data that never changes.

use crate::layout::ClassLayout;
use crate::position::Position;
use crate::storage::StorageLocation;
use crate::types::{ClassHierarchy, Type};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

/// A label assigned to an interned string literal, e.g. `L3`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StringLabel(pub u32);

impl Display for StringLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Interns string literal text to a stable label, assigning a fresh one on
/// first occurrence and reusing it on every subsequent occurrence of the
/// same text. Accumulates across the whole program.
#[derive(Debug, Default)]
pub struct StringTable {
    labels: HashMap<String, StringLabel>,
    /// Insertion order, so codegen can emit `.data` entries deterministically.
    order: Vec<String>,
    next: u32,
}

impl StringTable {
    pub fn intern(&mut self, text: &str) -> StringLabel {
        if let Some(label) = self.labels.get(text) {
            return *label;
        }
        self.next += 1;
        let label = StringLabel(self.next);
        self.labels.insert(text.to_string(), label);
        self.order.push(text.to_string());
        label
    }

    /// All interned strings in the order they were first seen, paired with
    /// their label.
    pub fn entries(&self) -> impl Iterator<Item = (&str, StringLabel)> {
        self.order
            .iter()
            .map(move |text| (text.as_str(), self.labels[text]))
    }

    /// The highest label number handed out so far. Code generation starts
    /// its own jump-label counter from here: string interning and
    /// jump-target allocation share one process-wide `L<n>` sequence, even
    /// though `StringLabel` and `codegen::labels::JumpLabel` are kept as
    /// distinct Rust types.
    pub fn counter(&self) -> u32 {
        self.next
    }
}

/// A function or method's signature, plus the label its body is emitted
/// under (`top_<name>` for free functions, `cls_<class>_<method>` for
/// methods).
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionSig {
    pub return_type: Type,
    pub params: Vec<Type>,
    pub label: String,
}

/// A class as known to the class table: its own (non-inherited) fields and
/// methods. The full inheritance chain, flattened field list, and vtable
/// live in [`crate::layout::ClassLayout`], computed once the whole class
/// table is registered.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassInfo {
    pub name: String,
    pub parent: Option<String>,
    pub own_fields: Vec<(String, Type)>,
    pub own_methods: HashMap<String, FunctionSig>,
    pub pos: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarEntry {
    pub ty: Type,
    pub level: usize,
    pub location: StorageLocation,
}

/// The environment threaded through semantic analysis of one program.
pub struct Environment {
    pub fun: Rc<HashMap<String, FunctionSig>>,
    pub cls: Rc<HashMap<String, ClassInfo>>,
    /// Every registered class's resolved layout, keyed by class name.
    /// Built once, right after `cls` is populated and checked acyclic (see
    /// `sema::program`), and shared rather than cloned like `fun`/`cls`.
    pub layouts: Rc<HashMap<String, ClassLayout>>,
    scopes: Vec<HashMap<String, VarEntry>>,
    pub current_fun: Option<(String, Type)>,
    pub in_class: Option<String>,
    pub strings: StringTable,
    pub was_return: bool,
    pub stack_counter: i32,
}

impl Environment {
    pub fn new(
        fun: HashMap<String, FunctionSig>,
        cls: HashMap<String, ClassInfo>,
        layouts: HashMap<String, ClassLayout>,
    ) -> Self {
        Self {
            fun: Rc::new(fun),
            cls: Rc::new(cls),
            layouts: Rc::new(layouts),
            scopes: vec![HashMap::new()],
            current_fun: None,
            in_class: None,
            strings: StringTable::default(),
            was_return: false,
            stack_counter: 0,
        }
    }

    /// Current block nesting depth. Level 0 is the top level; a function
    /// body opens level 1.
    pub fn level(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
        debug_assert!(!self.scopes.is_empty(), "popped the top-level scope");
    }

    /// Declare a variable in the innermost scope. Fails if a variable of
    /// the same name already exists at this exact scope level (shadowing a
    /// variable from an *enclosing* level is fine).
    pub fn declare_var(
        &mut self,
        name: &str,
        ty: Type,
        location: StorageLocation,
    ) -> Result<(), ()> {
        let level = self.level();
        let top = self.scopes.last_mut().expect("at least one scope");
        if top.contains_key(name) {
            return Err(());
        }
        top.insert(
            name.to_string(),
            VarEntry {
                ty,
                level,
                location,
            },
        );
        Ok(())
    }

    /// Resolve a variable, innermost scope first.
    pub fn lookup_var(&self, name: &str) -> Option<&VarEntry> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
    }

    pub fn lookup_fun(&self, name: &str) -> Option<&FunctionSig> {
        self.fun.get(name)
    }

    pub fn lookup_class(&self, name: &str) -> Option<&ClassInfo> {
        self.cls.get(name)
    }

    /// Allocate a new local of the given size at the next free slot below
    /// the frame pointer. Slots are always 8-byte aligned (`stack_counter`
    /// only ever moves by multiples of 8), regardless of the value's width.
    pub fn alloc_local(&mut self, _size: u32) -> StorageLocation {
        self.stack_counter -= 8;
        StorageLocation::rbp(self.stack_counter, _size)
    }

    pub fn intern_string(&mut self, text: &str) -> StringLabel {
        self.strings.intern(text)
    }
}

impl ClassHierarchy for Environment {
    fn parent_of(&self, class: &str) -> Option<String> {
        self.cls.get(class).and_then(|info| info.parent.clone())
    }
}
