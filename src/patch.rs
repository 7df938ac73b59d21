//! Two-pass tree mutation: collect patches against the unmodified tree,
//! then apply them in a second pass.
//!
//! Mutating while traversing risks skipping nested closures or revisiting
//! rewritten nodes, so collection runs over the original tree and records a
//! stable handle per fn-like node: its ordinal in a fixed traversal order.
//! The apply pass replays the identical traversal and prepends each patch's
//! statements when its ordinal comes up; its own insertions are never
//! re-visited because each body is patched only after its original contents
//! were walked. Any patch left over afterwards means its handle no longer
//! resolves, which the caller reports as a tree-consistency error.

use std::collections::HashMap;
use syn::visit::{self, Visit};
use syn::visit_mut::{self, VisitMut};

use crate::matcher::{self, ANONYMOUS};

/// One pending insertion: the prologue for the fn-like node with the given
/// traversal ordinal.
#[derive(Debug)]
pub struct Patch {
    pub ordinal: usize,
    pub stmts: Vec<syn::Stmt>,
}

/// Shape of one fn-like node, for signature matching.
pub enum FnShape<'ast> {
    Signature(&'ast syn::Signature),
    Closure(&'ast syn::ExprClosure),
}

/// Everything the selection policy sees about one fn-like node.
pub struct FnView<'ast> {
    /// Receiver type name; empty for free functions and closures.
    pub receiver: String,
    /// Display name; closures share [`ANONYMOUS`].
    pub name: String,
    pub shape: FnShape<'ast>,
    /// None for trait methods without a default body and for closures whose
    /// body is not a block. Such units can never receive a patch.
    pub body: Option<&'ast syn::Block>,
}

/// Walk every function, method, trait default method, and closure in
/// declaration order, asking `decide` for the statements to prepend.
/// An empty statement list records no patch.
pub fn collect_patches<F>(file: &syn::File, decide: F) -> Vec<Patch>
where
    F: for<'a> FnMut(&FnView<'a>) -> Vec<syn::Stmt>,
{
    let mut collector = Collector {
        next_ordinal: 0,
        receiver: String::new(),
        patches: Vec::new(),
        decide,
    };
    collector.visit_file(file);
    collector.patches
}

/// Prepend each patch's statements to the body of the node its ordinal
/// names, preserving the existing statements and their order. Returns the
/// number of patches whose handle was never reached (zero in normal
/// operation).
pub fn apply_patches(file: &mut syn::File, patches: Vec<Patch>) -> usize {
    let mut applier = Applier {
        next_ordinal: 0,
        pending: patches
            .into_iter()
            .map(|patch| (patch.ordinal, patch.stmts))
            .collect(),
    };
    applier.visit_file_mut(file);
    applier.pending.len()
}

struct Collector<F> {
    next_ordinal: usize,
    receiver: String,
    patches: Vec<Patch>,
    decide: F,
}

impl<F> Collector<F>
where
    F: for<'a> FnMut(&FnView<'a>) -> Vec<syn::Stmt>,
{
    fn bump(&mut self) -> usize {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        ordinal
    }

    fn consider(&mut self, ordinal: usize, view: FnView<'_>) {
        if view.body.is_none() {
            return;
        }
        let stmts = (self.decide)(&view);
        if !stmts.is_empty() {
            self.patches.push(Patch { ordinal, stmts });
        }
    }
}

impl<'ast, F> Visit<'ast> for Collector<F>
where
    F: for<'a> FnMut(&FnView<'a>) -> Vec<syn::Stmt>,
{
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        let ordinal = self.bump();
        self.consider(
            ordinal,
            FnView {
                receiver: String::new(),
                name: node.sig.ident.to_string(),
                shape: FnShape::Signature(&node.sig),
                body: Some(&node.block),
            },
        );
        visit::visit_item_fn(self, node);
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        let ordinal = self.bump();
        self.consider(
            ordinal,
            FnView {
                receiver: self.receiver.clone(),
                name: node.sig.ident.to_string(),
                shape: FnShape::Signature(&node.sig),
                body: Some(&node.block),
            },
        );
        visit::visit_impl_item_fn(self, node);
    }

    fn visit_trait_item_fn(&mut self, node: &'ast syn::TraitItemFn) {
        let ordinal = self.bump();
        self.consider(
            ordinal,
            FnView {
                receiver: self.receiver.clone(),
                name: node.sig.ident.to_string(),
                shape: FnShape::Signature(&node.sig),
                body: node.default.as_ref(),
            },
        );
        visit::visit_trait_item_fn(self, node);
    }

    fn visit_expr_closure(&mut self, node: &'ast syn::ExprClosure) {
        let ordinal = self.bump();
        let body = match node.body.as_ref() {
            syn::Expr::Block(expr_block) => Some(&expr_block.block),
            _ => None,
        };
        self.consider(
            ordinal,
            FnView {
                receiver: String::new(),
                name: ANONYMOUS.to_string(),
                shape: FnShape::Closure(node),
                body,
            },
        );
        visit::visit_expr_closure(self, node);
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        let previous = std::mem::replace(
            &mut self.receiver,
            matcher::type_receiver_name(&node.self_ty),
        );
        visit::visit_item_impl(self, node);
        self.receiver = previous;
    }

    fn visit_item_trait(&mut self, node: &'ast syn::ItemTrait) {
        let previous = std::mem::replace(&mut self.receiver, node.ident.to_string());
        visit::visit_item_trait(self, node);
        self.receiver = previous;
    }
}

struct Applier {
    next_ordinal: usize,
    pending: HashMap<usize, Vec<syn::Stmt>>,
}

impl Applier {
    fn bump(&mut self) -> usize {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        ordinal
    }

    fn prepend(&mut self, ordinal: usize, block: &mut syn::Block) {
        if let Some(stmts) = self.pending.remove(&ordinal) {
            block.stmts.splice(0..0, stmts);
        }
    }
}

impl VisitMut for Applier {
    fn visit_item_fn_mut(&mut self, node: &mut syn::ItemFn) {
        let ordinal = self.bump();
        visit_mut::visit_item_fn_mut(self, node);
        self.prepend(ordinal, &mut node.block);
    }

    fn visit_impl_item_fn_mut(&mut self, node: &mut syn::ImplItemFn) {
        let ordinal = self.bump();
        visit_mut::visit_impl_item_fn_mut(self, node);
        self.prepend(ordinal, &mut node.block);
    }

    fn visit_trait_item_fn_mut(&mut self, node: &mut syn::TraitItemFn) {
        let ordinal = self.bump();
        visit_mut::visit_trait_item_fn_mut(self, node);
        if let Some(block) = &mut node.default {
            self.prepend(ordinal, block);
        }
    }

    fn visit_expr_closure_mut(&mut self, node: &mut syn::ExprClosure) {
        let ordinal = self.bump();
        visit_mut::visit_expr_closure_mut(self, node);
        if let syn::Expr::Block(expr_block) = node.body.as_mut() {
            self.prepend(ordinal, &mut expr_block.block);
        }
    }
}
