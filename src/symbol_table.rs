//! Scoped symbol tables.
//!
//! Two independent instances exist per class: the class-scope table holds
//! `Static`/`Field` bindings; the subroutine-scope table holds `Arg`/`Var`
//! bindings and is reset at the start of every subroutine.

use std::collections::HashMap;

use crate::vm::Segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    StaticF,
    Field,
    Arg,
    Var,
    None,
}

impl SymbolKind {
    /// The VM segment a variable of this kind is accessed through.
    ///
    /// `None` has no segment; callers must not ask for one.
    pub fn segment(self) -> Segment {
        match self {
            SymbolKind::StaticF => Segment::Static,
            SymbolKind::Field => Segment::This,
            SymbolKind::Arg => Segment::Argument,
            SymbolKind::Var => Segment::Local,
            SymbolKind::None => panic!("SymbolKind::None has no VM segment"),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    index: usize,
    type_name: String,
}

/// The result of resolving a name: its kind, type, and segment index.
/// `kind == SymbolKind::None` means the name was not found in this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub kind: SymbolKind,
    pub index: usize,
    pub type_name: &'a str,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    statics: HashMap<String, Entry>,
    fields: HashMap<String, Entry>,
    args: HashMap<String, Entry>,
    vars: HashMap<String, Entry>,

    static_count: usize,
    field_count: usize,
    arg_count: usize,
    var_count: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn table_mut(&mut self, kind: SymbolKind) -> (&mut HashMap<String, Entry>, &mut usize) {
        match kind {
            SymbolKind::StaticF => (&mut self.statics, &mut self.static_count),
            SymbolKind::Field => (&mut self.fields, &mut self.field_count),
            SymbolKind::Arg => (&mut self.args, &mut self.arg_count),
            SymbolKind::Var => (&mut self.vars, &mut self.var_count),
            SymbolKind::None => panic!("cannot define a symbol of kind None"),
        }
    }

    fn table(&self, kind: SymbolKind) -> &HashMap<String, Entry> {
        match kind {
            SymbolKind::StaticF => &self.statics,
            SymbolKind::Field => &self.fields,
            SymbolKind::Arg => &self.args,
            SymbolKind::Var => &self.vars,
            SymbolKind::None => panic!("kind None is never stored"),
        }
    }

    /// Empties all four mappings and resets their counters.
    pub fn reset(&mut self) {
        self.statics.clear();
        self.fields.clear();
        self.args.clear();
        self.vars.clear();
        self.static_count = 0;
        self.field_count = 0;
        self.arg_count = 0;
        self.var_count = 0;
    }

    /// Defines `name` at the current counter for `kind`, then advances it.
    /// Redefinition overwrites silently: the source language disallows
    /// shadowing, but this compiler does not check for it. The counter
    /// advances on every call, even a redefinition, since it tracks
    /// "slots assigned so far" rather than "distinct names currently
    /// live" — those coincide except on redefinition.
    pub fn define(&mut self, name: &str, type_name: &str, kind: SymbolKind) {
        let (table, counter) = self.table_mut(kind);
        let index = *counter;
        *counter += 1;
        table.insert(
            name.to_owned(),
            Entry {
                index,
                type_name: type_name.to_owned(),
            },
        );
    }

    /// Looks `name` up across all four kinds. Returns `SymbolKind::None`
    /// (with an empty type name) if the name was never defined here.
    pub fn resolve(&self, name: &str) -> Resolved<'_> {
        for kind in [
            SymbolKind::StaticF,
            SymbolKind::Field,
            SymbolKind::Arg,
            SymbolKind::Var,
        ] {
            if let Some(entry) = self.table(kind).get(name) {
                return Resolved {
                    kind,
                    index: entry.index,
                    type_name: &entry.type_name,
                };
            }
        }
        Resolved {
            kind: SymbolKind::None,
            index: 0,
            type_name: "",
        }
    }

    /// The number of distinct names defined at `kind`.
    pub fn var_count(&self, kind: SymbolKind) -> usize {
        self.table(kind).len()
    }
}
